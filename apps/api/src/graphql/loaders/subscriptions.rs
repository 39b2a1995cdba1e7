//! Subscription batch loaders
//!
//! Both directions read the same join table. Records carry the edge, so
//! grouping uses the side the lookup was keyed on: the subscriber when
//! listing the authors a user follows, the author when listing followers.

use uuid::Uuid;

use crate::batch::{BatchFn, Loader, Many};
use crate::models::SubscribedUser;
use crate::repositories::{SharedStore, StoreResult};

/// Authors each subscriber follows
#[derive(Clone)]
pub struct SubscribedToBatch {
    store: SharedStore,
}

impl SubscribedToBatch {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl BatchFn for SubscribedToBatch {
    type Key = Uuid;
    type Record = SubscribedUser;

    const NAME: &'static str = "subscribed_to_by_subscriber";

    fn key_of(record: &SubscribedUser) -> Uuid {
        record.edge.subscriber_id
    }

    async fn fetch(&self, keys: &[Uuid]) -> StoreResult<Vec<SubscribedUser>> {
        self.store.authors_by_subscriber_ids(keys).await
    }
}

/// Subscribers of each author
#[derive(Clone)]
pub struct SubscribersBatch {
    store: SharedStore,
}

impl SubscribersBatch {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl BatchFn for SubscribersBatch {
    type Key = Uuid;
    type Record = SubscribedUser;

    const NAME: &'static str = "subscribers_by_author";

    fn key_of(record: &SubscribedUser) -> Uuid {
        record.edge.author_id
    }

    async fn fetch(&self, keys: &[Uuid]) -> StoreResult<Vec<SubscribedUser>> {
        self.store.subscribers_by_author_ids(keys).await
    }
}

pub type SubscribedToLoader = Loader<SubscribedToBatch, Many>;
pub type SubscribersLoader = Loader<SubscribersBatch, Many>;
