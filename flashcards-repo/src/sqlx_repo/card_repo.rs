use super::SQLxRepo;
use crate::card_repo::CardRepoError::{CardNotFound, LabelNotFound};
use crate::card_repo::{Card, CardId, CardRepo, CardRepoError, NewCard};
use crate::label_repo::LabelId;
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_scalar, Executor, Postgres, QueryBuilder};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CardEntry {
    id: i32,
    side_a: String,
    side_b: String,
    proficiency_level: i32,
    user_id: i32,
    label_ids: Vec<i32>,
}

impl From<CardEntry> for Card {
    fn from(value: CardEntry) -> Self {
        Card {
            id: value.id,
            side_a: value.side_a,
            side_b: value.side_b,
            proficiency_level: value.proficiency_level,
            user_id: value.user_id,
            label_ids: value.label_ids,
        }
    }
}

const SELECT_CARDS: &str = r#"
    SELECT c.id, c.side_a, c.side_b, c.proficiency_level, c.user_id,
           COALESCE(ARRAY_AGG(lc.label_id ORDER BY lc.label_id)
                    FILTER (WHERE lc.label_id IS NOT NULL), '{}') AS label_ids
    FROM cards c
    LEFT JOIN label_cards lc ON lc.card_id = c.id
    WHERE c.user_id = "#;

impl SQLxRepo {
    #[instrument(skip(db_executor))]
    async fn get_card_entries<'e, E>(
        db_executor: E,
        user_id: UserId,
        card_id: Option<CardId>,
        label_id: Option<LabelId>,
    ) -> Result<Vec<CardEntry>, CardRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_CARDS);
        query_builder.push_bind(user_id);
        if let Some(card_id) = card_id {
            query_builder.push(" AND c.id = ").push_bind(card_id);
        }
        if let Some(label_id) = label_id {
            query_builder
                .push(" AND EXISTS (SELECT 1 FROM label_cards f WHERE f.card_id = c.id AND f.label_id = ")
                .push_bind(label_id)
                .push(")");
        }
        query_builder.push(" GROUP BY c.id ORDER BY c.id");

        let card_entries: Vec<CardEntry> = query_builder
            .build_query_as::<CardEntry>()
            .fetch_all(db_executor)
            .await
            .with_context(|| format!("Unable to get cards for user {}", user_id))?;
        Ok(card_entries)
    }

    /// Fails with [CardRepoError::LabelNotFound] naming the first label not owned by the user.
    #[instrument(skip(db_executor))]
    async fn check_labels<'e, E>(
        db_executor: E,
        user_id: UserId,
        label_ids: &[LabelId],
    ) -> Result<(), CardRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if label_ids.is_empty() {
            return Ok(());
        }

        let owned: Vec<i32> = query_scalar("SELECT id FROM labels WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(label_ids)
            .fetch_all(db_executor)
            .await
            .context("Unable to check labels")?;
        match label_ids.iter().find(|l| !owned.contains(l)) {
            Some(label_id) => Err(LabelNotFound(*label_id)),
            None => Ok(()),
        }
    }

    #[instrument(skip(db_executor, new_card))]
    async fn insert_card_entry<'e, E>(
        db_executor: E,
        user_id: UserId,
        new_card: &NewCard,
    ) -> Result<CardId, CardRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = query_scalar(
            "INSERT INTO cards(side_a, side_b, proficiency_level, user_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_card.side_a)
        .bind(&new_card.side_b)
        .bind(new_card.proficiency_level)
        .bind(user_id)
        .fetch_one(db_executor)
        .await
        .context("Unable to insert card")?;
        Ok(id)
    }

    #[instrument(skip(db_executor))]
    async fn insert_label_cards<'e, E>(
        db_executor: E,
        card_id: CardId,
        label_ids: &[LabelId],
    ) -> Result<(), CardRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if label_ids.is_empty() {
            return Ok(());
        }

        query("INSERT INTO label_cards(label_id, card_id) SELECT UNNEST($1::int4[]), $2")
            .bind(label_ids)
            .bind(card_id)
            .execute(db_executor)
            .await
            .with_context(|| format!("Unable to associate labels with card {}", card_id))?;
        Ok(())
    }
}

#[async_trait]
impl CardRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_cards(
        &self,
        user_id: UserId,
        label_id: Option<LabelId>,
    ) -> Result<Vec<Card>, CardRepoError> {
        if let Some(label_id) = label_id {
            Self::check_labels(&self.pool, user_id, &[label_id]).await?;
        }

        let cards = Self::get_card_entries(&self.pool, user_id, None, label_id)
            .await?
            .into_iter()
            .map(Card::from)
            .collect();
        Ok(cards)
    }

    #[instrument(skip(self))]
    async fn get_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, CardRepoError> {
        Self::get_card_entries(&self.pool, user_id, Some(card_id), None)
            .await?
            .pop()
            .map(Card::from)
            .ok_or(CardNotFound(card_id))
    }

    #[instrument(skip(self, new_card))]
    async fn create_card(&self, user_id: UserId, new_card: NewCard) -> Result<Card, CardRepoError> {
        self.create_cards(user_id, vec![new_card])
            .await?
            .pop()
            .context("Inserted card missing from result")
            .map_err(CardRepoError::from)
    }

    #[instrument(skip(self, new_cards), fields(count = new_cards.len()))]
    async fn create_cards(
        &self,
        user_id: UserId,
        new_cards: Vec<NewCard>,
    ) -> Result<Vec<Card>, CardRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        let mut cards = Vec::with_capacity(new_cards.len());
        for new_card in new_cards {
            Self::check_labels(&mut *db_transaction, user_id, &new_card.label_ids).await?;
            let id = Self::insert_card_entry(&mut *db_transaction, user_id, &new_card).await?;
            let card = new_card.to_card(id, user_id);
            Self::insert_label_cards(&mut *db_transaction, id, &card.label_ids).await?;
            cards.push(card);
        }

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;
        Ok(cards)
    }

    #[instrument(skip(self, updated_card))]
    async fn update_card(
        &self,
        user_id: UserId,
        card_id: CardId,
        updated_card: NewCard,
    ) -> Result<Card, CardRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        let result = query(
            "UPDATE cards SET side_a = $1, side_b = $2, proficiency_level = $3 WHERE id = $4 AND user_id = $5",
        )
        .bind(&updated_card.side_a)
        .bind(&updated_card.side_b)
        .bind(updated_card.proficiency_level)
        .bind(card_id)
        .bind(user_id)
        .execute(&mut *db_transaction)
        .await
        .with_context(|| format!("Unable to update card {}", card_id))?;
        if result.rows_affected() == 0 {
            return Err(CardNotFound(card_id));
        }

        let card = updated_card.to_card(card_id, user_id);
        Self::check_labels(&mut *db_transaction, user_id, &card.label_ids).await?;
        query("DELETE FROM label_cards WHERE card_id = $1")
            .bind(card_id)
            .execute(&mut *db_transaction)
            .await
            .context("Unable to clear label associations")?;
        Self::insert_label_cards(&mut *db_transaction, card_id, &card.label_ids).await?;

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;
        Ok(card)
    }

    #[instrument(skip(self))]
    async fn delete_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, CardRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        let card: Card = Self::get_card_entries(&mut *db_transaction, user_id, Some(card_id), None)
            .await?
            .pop()
            .map(Card::from)
            .ok_or(CardNotFound(card_id))?;

        query("DELETE FROM label_cards WHERE card_id = $1")
            .bind(card_id)
            .execute(&mut *db_transaction)
            .await
            .context("Unable to delete label associations")?;
        query("DELETE FROM cards WHERE id = $1")
            .bind(card_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to delete card {}", card_id))?;

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;
        Ok(card)
    }
}
