//! Profile queries for Trellis GraphQL API

use async_graphql::{Context, ErrorExtensions, Object, Result};
use uuid::Uuid;

use crate::graphql::types::Profile;
use crate::repositories::SharedStore;

/// Profile-related queries
#[derive(Default)]
pub struct ProfileQuery;

#[Object]
impl ProfileQuery {
    /// All profiles
    async fn profiles(&self, ctx: &Context<'_>) -> Result<Vec<Profile>> {
        let store = ctx.data::<SharedStore>()?;
        let profiles = store.list_profiles().await.map_err(|e| e.extend())?;
        Ok(profiles.into_iter().map(Profile::from).collect())
    }

    /// A single profile by id
    async fn profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Profile>> {
        let store = ctx.data::<SharedStore>()?;
        let profile = store.find_profile(id).await.map_err(|e| e.extend())?;
        Ok(profile.map(Profile::from))
    }
}
