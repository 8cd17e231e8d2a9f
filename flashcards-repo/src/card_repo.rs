use crate::label_repo::LabelId;
use crate::user_repo::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CardId = i32;

#[async_trait]
pub trait CardRepo: Sync + Send {
    /// Returns the user's cards ordered by id, restricted to those tagged with `label_id` if
    /// given. Fails with [CardRepoError::LabelNotFound] if the label is not the user's.
    async fn get_cards(
        &self,
        user_id: UserId,
        label_id: Option<LabelId>,
    ) -> Result<Vec<Card>, CardRepoError>;

    async fn get_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, CardRepoError>;

    async fn create_card(&self, user_id: UserId, new_card: NewCard) -> Result<Card, CardRepoError>;

    /// Creates all cards or none of them.
    async fn create_cards(
        &self,
        user_id: UserId,
        new_cards: Vec<NewCard>,
    ) -> Result<Vec<Card>, CardRepoError>;

    /// Replaces the card's sides, proficiency level and label set.
    async fn update_card(
        &self,
        user_id: UserId,
        card_id: CardId,
        updated_card: NewCard,
    ) -> Result<Card, CardRepoError>;

    async fn delete_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, CardRepoError>;
}

#[derive(Error, Debug)]
pub enum CardRepoError {
    #[error("Card with id {0} not found")]
    CardNotFound(CardId),
    #[error("Label with id {0} not found")]
    LabelNotFound(LabelId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Card {
    pub id: CardId,
    pub side_a: String,
    pub side_b: String,
    pub proficiency_level: i32,
    pub user_id: UserId,
    /// Sorted, without duplicates.
    pub label_ids: Vec<LabelId>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewCard {
    pub side_a: String,
    pub side_b: String,
    pub proficiency_level: i32,
    pub label_ids: Vec<LabelId>,
}

impl NewCard {
    pub fn new(
        side_a: String,
        side_b: String,
        proficiency_level: i32,
        label_ids: Vec<LabelId>,
    ) -> NewCard {
        NewCard {
            side_a,
            side_b,
            proficiency_level,
            label_ids: normalize_label_ids(label_ids),
        }
    }

    pub fn to_card(self, id: CardId, user_id: UserId) -> Card {
        Card {
            id,
            side_a: self.side_a,
            side_b: self.side_b,
            proficiency_level: self.proficiency_level,
            user_id,
            label_ids: normalize_label_ids(self.label_ids),
        }
    }
}

impl From<Card> for NewCard {
    fn from(card: Card) -> Self {
        NewCard {
            side_a: card.side_a,
            side_b: card.side_b,
            proficiency_level: card.proficiency_level,
            label_ids: card.label_ids,
        }
    }
}

pub(crate) fn normalize_label_ids(mut label_ids: Vec<LabelId>) -> Vec<LabelId> {
    label_ids.sort_unstable();
    label_ids.dedup();
    label_ids
}

#[cfg(test)]
mod tests {
    use super::NewCard;

    #[test]
    fn duplicate_labels_collapse() {
        let new_card = NewCard::new("a".into(), "b".into(), 0, vec![3, 1, 3, 2, 1]);
        assert_eq!(vec![1, 2, 3], new_card.label_ids);

        let card = new_card.to_card(7, 1);
        assert_eq!(vec![1, 2, 3], card.label_ids);
    }
}
