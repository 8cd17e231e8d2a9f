use async_trait::async_trait;
use std::sync::Arc;

pub mod card_repo;
pub mod label_repo;
pub mod user_repo;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;

use card_repo::CardRepo;
use label_repo::LabelRepo;
use user_repo::UserRepo;

/// Handles to one backing store, one per concern.
#[derive(Clone)]
pub struct Repos {
    pub user_repo: Arc<dyn UserRepo>,
    pub label_repo: Arc<dyn LabelRepo>,
    pub card_repo: Arc<dyn CardRepo>,
    pub health_check: Arc<dyn HealthCheck>,
}

impl Repos {
    pub fn from_store<R>(store: Arc<R>) -> Repos
    where
        R: UserRepo + LabelRepo + CardRepo + HealthCheck + 'static,
    {
        Repos {
            user_repo: store.clone(),
            label_repo: store.clone(),
            card_repo: store.clone(),
            health_check: store,
        }
    }
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> bool;
}
