//! Subscription mutations for Trellis GraphQL API
//!
//! - subscribeTo: Start following an author; a pair can exist only once
//! - unsubscribeFrom: Stop following an author

use async_graphql::{Context, ErrorExtensions, Object, Result};
use uuid::Uuid;

use crate::models::SubscriptionEdge;
use crate::repositories::SharedStore;

use super::invalidate;

/// Subscription mutations
#[derive(Default)]
pub struct SubscriptionMutation;

#[Object]
impl SubscriptionMutation {
    async fn subscribe_to(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<String> {
        let store = ctx.data::<SharedStore>()?;
        let edge = SubscriptionEdge::new(user_id, author_id);
        store.subscribe(edge).await.map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.subscribed_to_by_subscriber.clear(&user_id);
            loaders.subscribers_by_author.clear(&author_id);
        });
        tracing::debug!(subscriber_id = %user_id, author_id = %author_id, "Subscribed");
        Ok("Subscribed".to_string())
    }

    async fn unsubscribe_from(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<String> {
        let store = ctx.data::<SharedStore>()?;
        let edge = SubscriptionEdge::new(user_id, author_id);
        store.unsubscribe(edge).await.map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.subscribed_to_by_subscriber.clear(&user_id);
            loaders.subscribers_by_author.clear(&author_id);
        });
        Ok("Unsubscribed".to_string())
    }
}
