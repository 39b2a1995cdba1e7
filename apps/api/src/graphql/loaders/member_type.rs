//! Member type batch loader
//!
//! Many profiles share one of two tiers, so a page of profiles collapses to
//! a single lookup of at most two keys.

use crate::batch::{BatchFn, Loader, One};
use crate::models::{MemberType, MemberTypeId};
use crate::repositories::{SharedStore, StoreResult};

#[derive(Clone)]
pub struct MemberTypeBatch {
    store: SharedStore,
}

impl MemberTypeBatch {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl BatchFn for MemberTypeBatch {
    type Key = MemberTypeId;
    type Record = MemberType;

    const NAME: &'static str = "member_type_by_id";

    fn key_of(member_type: &MemberType) -> MemberTypeId {
        member_type.id
    }

    async fn fetch(&self, keys: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        self.store.member_types_by_ids(keys).await
    }
}

pub type MemberTypeLoader = Loader<MemberTypeBatch, One>;
