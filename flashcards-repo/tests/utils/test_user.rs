use flashcards_repo::user_repo::{NewUser, User, UserRepo};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[allow(dead_code)]
pub fn new_user() -> NewUser {
    let suffix = Uuid::new_v4().to_string();
    NewUser::new(
        format!("test-user-{}@example.com", suffix),
        "not a real hash".to_owned(),
        format!("web-{}", suffix),
        format!("chrome-{}", suffix),
    )
}

#[allow(dead_code)]
pub struct TestUser {
    pub user: User,
    repo: Arc<dyn UserRepo>,
}

#[allow(dead_code)]
impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let user = user_repo.create_user(new_user()).await.unwrap();
        info!(user_id = user.id, "Created user");
        TestUser {
            user,
            repo: user_repo.clone(),
        }
    }

    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub async fn delete(&self) {
        self.repo.delete_user(self.user.id).await.unwrap()
    }
}
