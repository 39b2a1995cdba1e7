//! Membership tier GraphQL type and enum

use async_graphql::{Enum, Object};

use crate::models::{MemberType as DbMemberType, MemberTypeId as DbMemberTypeId};

/// Membership tier identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum MemberTypeId {
    /// Entry tier
    Basic,
    /// Paid tier
    Business,
}

impl From<DbMemberTypeId> for MemberTypeId {
    fn from(id: DbMemberTypeId) -> Self {
        match id {
            DbMemberTypeId::Basic => Self::Basic,
            DbMemberTypeId::Business => Self::Business,
        }
    }
}

impl From<MemberTypeId> for DbMemberTypeId {
    fn from(id: MemberTypeId) -> Self {
        match id {
            MemberTypeId::Basic => Self::Basic,
            MemberTypeId::Business => Self::Business,
        }
    }
}

/// Membership tier with its discount and posting allowance
pub struct MemberType {
    inner: DbMemberType,
}

impl From<DbMemberType> for MemberType {
    fn from(member_type: DbMemberType) -> Self {
        Self { inner: member_type }
    }
}

#[Object]
impl MemberType {
    async fn id(&self) -> MemberTypeId {
        self.inner.id.into()
    }

    /// Discount in percent
    async fn discount(&self) -> f64 {
        self.inner.discount
    }

    async fn posts_limit_per_month(&self) -> i32 {
        self.inner.posts_limit_per_month
    }
}
