//! Post mutations for Trellis GraphQL API

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result};
use uuid::Uuid;

use crate::graphql::types::Post;
use crate::models::{CreatePost, UpdatePost};
use crate::repositories::SharedStore;

use super::invalidate;

// =============================================================================
// Input Types
// =============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

impl From<CreatePostInput> for CreatePost {
    fn from(input: CreatePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct ChangePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<ChangePostInput> for UpdatePost {
    fn from(input: ChangePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
        }
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Post mutations
#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(&self, ctx: &Context<'_>, dto: CreatePostInput) -> Result<Post> {
        let store = ctx.data::<SharedStore>()?;
        let post = store.create_post(dto.into()).await.map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.posts_by_author.clear(&post.author_id);
        });
        Ok(post.into())
    }

    async fn change_post(&self, ctx: &Context<'_>, id: Uuid, dto: ChangePostInput) -> Result<Post> {
        let store = ctx.data::<SharedStore>()?;
        let post = store
            .update_post(id, dto.into())
            .await
            .map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.posts_by_author.clear(&post.author_id);
        });
        Ok(post.into())
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        let store = ctx.data::<SharedStore>()?;
        let post = store.delete_post(id).await.map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.posts_by_author.clear(&post.author_id);
        });
        Ok("Post deleted".to_string())
    }
}
