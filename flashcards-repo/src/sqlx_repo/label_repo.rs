use super::SQLxRepo;
use crate::label_repo::LabelRepoError::LabelNotFound;
use crate::label_repo::{Label, LabelId, LabelRepo, LabelRepoError, NewLabel};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct LabelEntry {
    id: i32,
    name: String,
    user_id: i32,
}

impl From<LabelEntry> for Label {
    fn from(value: LabelEntry) -> Self {
        Label {
            id: value.id,
            name: value.name,
            user_id: value.user_id,
        }
    }
}

#[async_trait]
impl LabelRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_labels(&self, user_id: UserId) -> Result<Vec<Label>, LabelRepoError> {
        let labels: Vec<LabelEntry> =
            query_as("SELECT * FROM labels WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .with_context(|| format!("Unable to get labels for user {}", user_id))?;
        Ok(labels.into_iter().map(Label::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_label(&self, user_id: UserId, label_id: LabelId) -> Result<Label, LabelRepoError> {
        let label: Option<LabelEntry> =
            query_as("SELECT * FROM labels WHERE id = $1 AND user_id = $2")
                .bind(label_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get label {}", label_id))?;
        label.map(Label::from).ok_or(LabelNotFound(label_id))
    }

    #[instrument(skip(self))]
    async fn create_label(
        &self,
        user_id: UserId,
        new_label: NewLabel,
    ) -> Result<Label, LabelRepoError> {
        let id: i32 = query_scalar("INSERT INTO labels(name, user_id) VALUES($1, $2) RETURNING id")
            .bind(&new_label.name)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("Unable to insert label")?;
        Ok(new_label.to_label(id, user_id))
    }

    #[instrument(skip(self))]
    async fn update_label(
        &self,
        user_id: UserId,
        label_id: LabelId,
        label: NewLabel,
    ) -> Result<Label, LabelRepoError> {
        let result = query("UPDATE labels SET name = $1 WHERE id = $2 AND user_id = $3")
            .bind(&label.name)
            .bind(label_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update label {}", label_id))?;
        if result.rows_affected() == 0 {
            Err(LabelNotFound(label_id))
        } else {
            Ok(label.to_label(label_id, user_id))
        }
    }

    #[instrument(skip(self))]
    async fn delete_label(
        &self,
        user_id: UserId,
        label_id: LabelId,
    ) -> Result<Label, LabelRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        let owned: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM labels WHERE id = $1 AND user_id = $2)")
                .bind(label_id)
                .bind(user_id)
                .fetch_one(&mut *db_transaction)
                .await
                .with_context(|| format!("Unable to get label {}", label_id))?;
        if !owned {
            return Err(LabelNotFound(label_id));
        }

        query("DELETE FROM label_cards WHERE label_id = $1")
            .bind(label_id)
            .execute(&mut *db_transaction)
            .await
            .context("Unable to delete label associations")?;
        let label: LabelEntry = query_as("DELETE FROM labels WHERE id = $1 RETURNING *")
            .bind(label_id)
            .fetch_one(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to delete label {}", label_id))?;

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;
        Ok(label.into())
    }
}
