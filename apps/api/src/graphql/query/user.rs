//! User queries for Trellis GraphQL API
//!
//! This module provides queries for users:
//! - users: All users
//! - user: A single user by id
//!
//! Both are planned: relations selected below them are joined into the root
//! fetch and primed into the request's loaders. `user(id)` with nothing to
//! join goes through the identity loader instead.

use async_graphql::{Context, ErrorExtensions, Object, Result};
use uuid::Uuid;

use crate::graphql::loaders::Loaders;
use crate::graphql::planner::{plan_user_includes, prime_user_graphs};
use crate::graphql::types::User;
use crate::models::{User as DbUser, UserIncludes};
use crate::repositories::SharedStore;

/// User-related queries
#[derive(Default)]
pub struct UserQuery;

impl UserQuery {
    async fn planned_fetch(
        ctx: &Context<'_>,
        id: Option<Uuid>,
        includes: UserIncludes,
    ) -> Result<Vec<DbUser>> {
        let store = ctx.data::<SharedStore>()?;
        let loaders = ctx.data::<Loaders>()?;

        tracing::debug!(
            profile = includes.profile,
            subscribed_to = includes.subscribed_to,
            subscribers = includes.subscribers,
            "Planned user fetch"
        );

        let graphs = store
            .find_users(id, includes)
            .await
            .map_err(|e| e.extend())?;
        Ok(prime_user_graphs(loaders, graphs))
    }
}

#[Object]
impl UserQuery {
    /// All users
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let includes = plan_user_includes(&ctx.look_ahead());
        let users = Self::planned_fetch(ctx, None, includes).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// A single user, or null if no user has this id
    ///
    /// Without relations to join the identity loader answers, so a user
    /// already seen in this request costs no store call.
    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        let includes = plan_user_includes(&ctx.look_ahead());
        if includes.is_empty() {
            let loaders = ctx.data::<Loaders>()?;
            let user = loaders.user_by_id.load(id).await.map_err(|e| e.extend())?;
            return Ok(user.map(User::from));
        }

        let users = Self::planned_fetch(ctx, Some(id), includes).await?;
        Ok(users.into_iter().next().map(User::from))
    }
}
