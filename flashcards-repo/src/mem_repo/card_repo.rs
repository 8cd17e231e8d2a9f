use super::{CardEntry, MemRepo, State};
use crate::card_repo::CardRepoError::{CardNotFound, LabelNotFound};
use crate::card_repo::{Card, CardId, CardRepo, CardRepoError, NewCard};
use crate::label_repo::LabelId;
use crate::user_repo::UserId;
use async_trait::async_trait;

impl State {
    fn card(&self, card_id: CardId) -> Card {
        let entry = self
            .cards
            .get(&card_id)
            .expect("card ids should be checked before lookup");
        Card {
            id: card_id,
            side_a: entry.side_a.clone(),
            side_b: entry.side_b.clone(),
            proficiency_level: entry.proficiency_level,
            user_id: entry.user_id,
            label_ids: self.label_ids_of(card_id),
        }
    }

    fn check_labels(&self, user_id: UserId, label_ids: &[LabelId]) -> Result<(), CardRepoError> {
        match label_ids.iter().find(|l| !self.owns_label(user_id, **l)) {
            Some(label_id) => Err(LabelNotFound(*label_id)),
            None => Ok(()),
        }
    }

    fn insert_card(&mut self, user_id: UserId, new_card: NewCard) -> Card {
        self.next_card_id += 1;
        let id = self.next_card_id;

        let card = new_card.to_card(id, user_id);
        self.cards.insert(
            id,
            CardEntry {
                side_a: card.side_a.clone(),
                side_b: card.side_b.clone(),
                proficiency_level: card.proficiency_level,
                user_id,
            },
        );
        for label_id in &card.label_ids {
            self.label_cards.insert((*label_id, id));
        }
        card
    }
}

#[async_trait]
impl CardRepo for MemRepo {
    async fn get_cards(
        &self,
        user_id: UserId,
        label_id: Option<LabelId>,
    ) -> Result<Vec<Card>, CardRepoError> {
        let read_guard = self.read_lock()?;

        if let Some(label_id) = label_id {
            read_guard.check_labels(user_id, &[label_id])?;
        }

        let cards = read_guard
            .cards
            .iter()
            .filter(|(_, c)| c.user_id == user_id)
            .map(|(id, _)| read_guard.card(*id))
            .filter(|c| label_id.map_or(true, |l| c.label_ids.contains(&l)))
            .collect();
        Ok(cards)
    }

    async fn get_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, CardRepoError> {
        let read_guard = self.read_lock()?;

        if !read_guard.owns_card(user_id, card_id) {
            return Err(CardNotFound(card_id));
        }
        Ok(read_guard.card(card_id))
    }

    async fn create_card(&self, user_id: UserId, new_card: NewCard) -> Result<Card, CardRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.check_labels(user_id, &new_card.label_ids)?;
        Ok(write_guard.insert_card(user_id, new_card))
    }

    async fn create_cards(
        &self,
        user_id: UserId,
        new_cards: Vec<NewCard>,
    ) -> Result<Vec<Card>, CardRepoError> {
        let mut write_guard = self.write_lock()?;

        for new_card in &new_cards {
            write_guard.check_labels(user_id, &new_card.label_ids)?;
        }
        let cards = new_cards
            .into_iter()
            .map(|new_card| write_guard.insert_card(user_id, new_card))
            .collect();
        Ok(cards)
    }

    async fn update_card(
        &self,
        user_id: UserId,
        card_id: CardId,
        updated_card: NewCard,
    ) -> Result<Card, CardRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_card(user_id, card_id) {
            return Err(CardNotFound(card_id));
        }
        write_guard.check_labels(user_id, &updated_card.label_ids)?;

        let card = updated_card.to_card(card_id, user_id);
        write_guard.cards.insert(
            card_id,
            CardEntry {
                side_a: card.side_a.clone(),
                side_b: card.side_b.clone(),
                proficiency_level: card.proficiency_level,
                user_id,
            },
        );
        write_guard.label_cards.retain(|(_, c)| *c != card_id);
        for label_id in &card.label_ids {
            write_guard.label_cards.insert((*label_id, card_id));
        }

        Ok(card)
    }

    async fn delete_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, CardRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_card(user_id, card_id) {
            return Err(CardNotFound(card_id));
        }

        let card = write_guard.card(card_id);
        write_guard.label_cards.retain(|(_, c)| *c != card_id);
        write_guard.cards.remove(&card_id);
        Ok(card)
    }
}
