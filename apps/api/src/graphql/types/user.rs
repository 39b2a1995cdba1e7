//! User GraphQL type
//!
//! Relation fields resolve through the request's loaders. When the root
//! field planned an eager join the loaders are already primed and these
//! resolvers settle without a store call. Users reached over a
//! subscription edge are read through the identity loader.

use async_graphql::{Context, ErrorExtensions, Object, Result};
use uuid::Uuid;

use crate::graphql::loaders::Loaders;
use crate::models::User as DbUser;

use super::post::Post;
use super::profile::Profile;

/// User exposed via GraphQL
pub struct User {
    inner: DbUser,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self { inner: user }
    }
}

#[Object]
impl User {
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn balance(&self) -> f64 {
        self.inner.balance
    }

    // Relationship resolvers

    /// The user's profile, if one exists (batched)
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let loaders = ctx.data::<Loaders>()?;
        let profile = loaders
            .profile_by_user
            .load(self.inner.id)
            .await
            .map_err(|e| e.extend())?;
        Ok(profile.map(Profile::from))
    }

    /// Posts written by the user (batched)
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let loaders = ctx.data::<Loaders>()?;
        let posts = loaders
            .posts_by_author
            .load(self.inner.id)
            .await
            .map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// Authors this user subscribes to (batched)
    async fn user_subscribed_to(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let loaders = ctx.data::<Loaders>()?;
        let edges = loaders
            .subscribed_to_by_subscriber
            .load(self.inner.id)
            .await
            .map_err(|e| e.extend())?;
        let authors = loaders
            .far_side_users(edges)
            .await
            .map_err(|e| e.extend())?;
        Ok(authors.into_iter().map(User::from).collect())
    }

    /// Users subscribed to this user (batched)
    async fn subscribed_to_user(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let loaders = ctx.data::<Loaders>()?;
        let edges = loaders
            .subscribers_by_author
            .load(self.inner.id)
            .await
            .map_err(|e| e.extend())?;
        let subscribers = loaders
            .far_side_users(edges)
            .await
            .map_err(|e| e.extend())?;
        Ok(subscribers.into_iter().map(User::from).collect())
    }
}
