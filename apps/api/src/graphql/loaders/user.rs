//! User-by-id batch loader
//!
//! Resolves the user on the far side of a relation when it was not primed
//! by the planner.

use uuid::Uuid;

use crate::batch::{BatchFn, Loader, One};
use crate::models::User;
use crate::repositories::{SharedStore, StoreResult};

/// Batches user lookups by id into one `users_by_ids` call
#[derive(Clone)]
pub struct UserBatch {
    store: SharedStore,
}

impl UserBatch {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl BatchFn for UserBatch {
    type Key = Uuid;
    type Record = User;

    const NAME: &'static str = "user_by_id";

    fn key_of(user: &User) -> Uuid {
        user.id
    }

    async fn fetch(&self, keys: &[Uuid]) -> StoreResult<Vec<User>> {
        self.store.users_by_ids(keys).await
    }
}

pub type UserLoader = Loader<UserBatch, One>;
