use super::MemRepo;
use crate::label_repo::LabelRepoError::LabelNotFound;
use crate::label_repo::{Label, LabelId, LabelRepo, LabelRepoError, NewLabel};
use crate::user_repo::UserId;
use async_trait::async_trait;

#[async_trait]
impl LabelRepo for MemRepo {
    async fn get_labels(&self, user_id: UserId) -> Result<Vec<Label>, LabelRepoError> {
        let read_guard = self.read_lock()?;

        let labels = read_guard
            .labels
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        Ok(labels)
    }

    async fn get_label(&self, user_id: UserId, label_id: LabelId) -> Result<Label, LabelRepoError> {
        let read_guard = self.read_lock()?;

        if !read_guard.owns_label(user_id, label_id) {
            return Err(LabelNotFound(label_id));
        }
        Ok(read_guard.labels[&label_id].clone())
    }

    async fn create_label(
        &self,
        user_id: UserId,
        new_label: NewLabel,
    ) -> Result<Label, LabelRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.next_label_id += 1;
        let id = write_guard.next_label_id;

        let label = new_label.to_label(id, user_id);
        write_guard.labels.insert(id, label.clone());

        Ok(label)
    }

    async fn update_label(
        &self,
        user_id: UserId,
        label_id: LabelId,
        label: NewLabel,
    ) -> Result<Label, LabelRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_label(user_id, label_id) {
            return Err(LabelNotFound(label_id));
        }

        let label = label.to_label(label_id, user_id);
        write_guard.labels.insert(label_id, label.clone());

        Ok(label)
    }

    async fn delete_label(
        &self,
        user_id: UserId,
        label_id: LabelId,
    ) -> Result<Label, LabelRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_label(user_id, label_id) {
            return Err(LabelNotFound(label_id));
        }

        write_guard.label_cards.retain(|(l, _)| *l != label_id);
        let label = write_guard
            .labels
            .remove(&label_id)
            .expect("label should exist if owned by user");
        Ok(label)
    }
}
