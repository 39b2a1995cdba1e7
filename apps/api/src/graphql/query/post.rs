//! Post queries for Trellis GraphQL API

use async_graphql::{Context, ErrorExtensions, Object, Result};
use uuid::Uuid;

use crate::graphql::types::Post;
use crate::repositories::SharedStore;

/// Post-related queries
#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let store = ctx.data::<SharedStore>()?;
        let posts = store.list_posts().await.map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// A single post by id
    async fn post(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Post>> {
        let store = ctx.data::<SharedStore>()?;
        let post = store.find_post(id).await.map_err(|e| e.extend())?;
        Ok(post.map(Post::from))
    }
}
