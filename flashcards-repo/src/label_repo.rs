use crate::user_repo::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type LabelId = i32;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    pub user_id: UserId,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewLabel {
    pub name: String,
}

impl NewLabel {
    pub fn new(name: String) -> NewLabel {
        NewLabel { name }
    }

    pub fn to_label(self, id: LabelId, user_id: UserId) -> Label {
        Label {
            id,
            name: self.name,
            user_id,
        }
    }
}

#[derive(Error, Debug)]
pub enum LabelRepoError {
    #[error("Label with id {0} not found")]
    LabelNotFound(LabelId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait LabelRepo: Sync + Send {
    async fn get_labels(&self, user_id: UserId) -> Result<Vec<Label>, LabelRepoError>;

    async fn get_label(&self, user_id: UserId, label_id: LabelId) -> Result<Label, LabelRepoError>;

    async fn create_label(
        &self,
        user_id: UserId,
        new_label: NewLabel,
    ) -> Result<Label, LabelRepoError>;

    async fn update_label(
        &self,
        user_id: UserId,
        label_id: LabelId,
        label: NewLabel,
    ) -> Result<Label, LabelRepoError>;

    /// Removes the label and its card associations. The cards themselves are kept.
    async fn delete_label(
        &self,
        user_id: UserId,
        label_id: LabelId,
    ) -> Result<Label, LabelRepoError>;
}
