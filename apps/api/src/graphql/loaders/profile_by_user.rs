//! Profile-by-user batch loader

use uuid::Uuid;

use crate::batch::{BatchFn, Loader, One};
use crate::models::Profile;
use crate::repositories::{SharedStore, StoreResult};

/// Batches profile lookups keyed by the owning user
///
/// A user without a profile resolves to `None`.
#[derive(Clone)]
pub struct ProfileByUserBatch {
    store: SharedStore,
}

impl ProfileByUserBatch {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl BatchFn for ProfileByUserBatch {
    type Key = Uuid;
    type Record = Profile;

    const NAME: &'static str = "profile_by_user";

    fn key_of(profile: &Profile) -> Uuid {
        profile.user_id
    }

    async fn fetch(&self, keys: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.store.profiles_by_user_ids(keys).await
    }
}

pub type ProfileByUserLoader = Loader<ProfileByUserBatch, One>;
