//! Membership tier queries for Trellis GraphQL API

use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::graphql::loaders::Loaders;
use crate::graphql::types::{MemberType, MemberTypeId};
use crate::repositories::SharedStore;

/// Membership tier queries
#[derive(Default)]
pub struct MemberTypeQuery;

#[Object]
impl MemberTypeQuery {
    /// All membership tiers
    async fn member_types(&self, ctx: &Context<'_>) -> Result<Vec<MemberType>> {
        let store = ctx.data::<SharedStore>()?;
        let member_types = store.list_member_types().await.map_err(|e| e.extend())?;
        Ok(member_types.into_iter().map(MemberType::from).collect())
    }

    /// A single membership tier (batched with nested tier lookups)
    async fn member_type(&self, ctx: &Context<'_>, id: MemberTypeId) -> Result<Option<MemberType>> {
        let loaders = ctx.data::<Loaders>()?;
        let member_type = loaders
            .member_type_by_id
            .load(id.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(member_type.map(MemberType::from))
    }
}
