use crate::card_repo::CardId;
use crate::label_repo::{Label, LabelId};
use crate::user_repo::{User, UserId};
use crate::{HealthCheck, Repos};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod card_repo;
mod label_repo;
mod user_repo;

struct CardEntry {
    side_a: String,
    side_b: String,
    proficiency_level: i32,
    user_id: UserId,
}

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    labels: BTreeMap<LabelId, Label>,
    cards: BTreeMap<CardId, CardEntry>,
    label_cards: BTreeSet<(LabelId, CardId)>,
    next_user_id: UserId,
    next_label_id: LabelId,
    next_card_id: CardId,
}

impl State {
    fn label_ids_of(&self, card_id: CardId) -> Vec<LabelId> {
        self.label_cards
            .iter()
            .filter(|(_, c)| *c == card_id)
            .map(|(l, _)| *l)
            .collect()
    }

    fn owns_label(&self, user_id: UserId, label_id: LabelId) -> bool {
        self.labels
            .get(&label_id)
            .map_or(false, |l| l.user_id == user_id)
    }

    fn owns_card(&self, user_id: UserId, card_id: CardId) -> bool {
        self.cards
            .get(&card_id)
            .map_or(false, |c| c.user_id == user_id)
    }
}

/// A single in-memory store backing all repos. Every operation runs under one lock, so
/// cascading deletes and batch inserts are atomic.
pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        MemRepo {
            state: RwLock::new(State::default()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}

#[async_trait]
impl HealthCheck for MemRepo {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}

pub fn create_repos() -> Repos {
    Repos::from_store(Arc::new(MemRepo::new()))
}
