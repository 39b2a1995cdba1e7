//! Profile GraphQL type
//!
//! The membership tier is resolved through the member type loader, so a
//! list of profiles costs one tier lookup no matter how many profiles share
//! a tier.

use async_graphql::{Context, ErrorExtensions, Object, Result};
use uuid::Uuid;

use crate::graphql::loaders::Loaders;
use crate::models::Profile as DbProfile;
use crate::repositories::StoreError;

use super::member_type::{MemberType, MemberTypeId};

/// Profile exposed via GraphQL
pub struct Profile {
    inner: DbProfile,
}

impl From<DbProfile> for Profile {
    fn from(profile: DbProfile) -> Self {
        Self { inner: profile }
    }
}

#[Object]
impl Profile {
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn is_male(&self) -> bool {
        self.inner.is_male
    }

    async fn year_of_birth(&self) -> i32 {
        self.inner.year_of_birth
    }

    /// Owning user
    async fn user_id(&self) -> Uuid {
        self.inner.user_id
    }

    async fn member_type_id(&self) -> MemberTypeId {
        self.inner.member_type_id.into()
    }

    /// Membership tier (batched)
    async fn member_type(&self, ctx: &Context<'_>) -> Result<MemberType> {
        let loaders = ctx.data::<Loaders>()?;
        let id = self.inner.member_type_id;
        let member_type = loaders
            .member_type_by_id
            .load(id)
            .await
            .map_err(|e| e.extend())?
            // Foreign key guarantees the tier exists
            .ok_or_else(|| StoreError::not_found("member type", id).extend())?;
        Ok(member_type.into())
    }
}
