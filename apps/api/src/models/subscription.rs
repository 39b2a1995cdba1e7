//! Subscription edge model for Trellis
//!
//! An edge has no identifier of its own; the `(subscriber_id, author_id)`
//! pair is its identity and is unique.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::User;

/// Row of the subscribers_on_authors join table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize)]
pub struct SubscriptionEdge {
    /// User who subscribes
    pub subscriber_id: Uuid,

    /// User being subscribed to
    pub author_id: Uuid,
}

impl SubscriptionEdge {
    pub fn new(subscriber_id: Uuid, author_id: Uuid) -> Self {
        Self {
            subscriber_id,
            author_id,
        }
    }
}

/// An edge joined with the user on its far side
///
/// Fetching authors by subscriber yields the author as `user`; fetching
/// subscribers by author yields the subscriber. The edge keeps the key the
/// record was matched on.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SubscribedUser {
    #[sqlx(flatten)]
    pub edge: SubscriptionEdge,

    #[sqlx(flatten)]
    pub user: User,
}
