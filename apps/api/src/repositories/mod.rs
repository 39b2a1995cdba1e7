//! Store layer for Trellis
//!
//! All persistence goes through the [`Store`] trait. Relation loaders use the
//! key-set fetches (`*_by_*_ids`), the root user queries use the eager-join
//! fetch [`Store::find_users`], and mutations call the write methods
//! directly.
//!
//! Two implementations are provided:
//! - [`PgStore`]: PostgreSQL through a shared sqlx pool
//! - [`MemoryStore`]: in-process tables with call counters, used by tests
//!   and for running without a database

pub mod memory;
pub mod postgres;
pub mod utils;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreatePost, CreateProfile, CreateUser, MemberType, MemberTypeId, Post, Profile,
    SubscribedUser, SubscriptionEdge, UpdatePost, UpdateProfile, UpdateUser, User, UserGraph,
    UserIncludes,
};

/// Errors reported by a [`Store`]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Row addressed by a write does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violated
    #[error("{entity} already exists: {detail}")]
    UniqueViolation { entity: &'static str, detail: String },

    /// Foreign key constraint violated
    #[error("{entity} references a missing row: {detail}")]
    ForeignKeyViolation { entity: &'static str, detail: String },

    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store could not serve the request
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Error code for client-side handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UniqueViolation { .. } => "UNIQUE_VIOLATION",
            Self::ForeignKeyViolation { .. } => "FOREIGN_KEY_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store handle shared by every loader and every request
pub type SharedStore = Arc<dyn Store>;

/// Persistence collaborator
///
/// Key-set fetches return matching records in any order and may omit keys
/// with no match; grouping and ordering are the caller's concern.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    // ==================== Key-set fetches ====================

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    async fn profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>>;

    async fn posts_by_author_ids(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>>;

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>>;

    /// Authors followed by each subscriber; records match on `edge.subscriber_id`
    async fn authors_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<SubscribedUser>>;

    /// Subscribers of each author; records match on `edge.author_id`
    async fn subscribers_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<SubscribedUser>>;

    // ==================== Root reads ====================

    /// Fetch all users, or the one with `id`, joining the requested relations
    async fn find_users(
        &self,
        id: Option<Uuid>,
        includes: UserIncludes,
    ) -> StoreResult<Vec<UserGraph>>;

    async fn list_member_types(&self) -> StoreResult<Vec<MemberType>>;

    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;

    async fn find_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;

    // ==================== Writes ====================

    async fn create_user(&self, input: CreateUser) -> StoreResult<User>;

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> StoreResult<User>;

    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile>;

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> StoreResult<Profile>;

    async fn delete_profile(&self, id: Uuid) -> StoreResult<Profile>;

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post>;

    async fn update_post(&self, id: Uuid, input: UpdatePost) -> StoreResult<Post>;

    async fn delete_post(&self, id: Uuid) -> StoreResult<Post>;

    /// Insert an edge; a duplicate pair fails with [`StoreError::UniqueViolation`]
    async fn subscribe(&self, edge: SubscriptionEdge) -> StoreResult<()>;

    async fn unsubscribe(&self, edge: SubscriptionEdge) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::not_found("user", "1").code(), "NOT_FOUND");
        assert_eq!(
            StoreError::UniqueViolation {
                entity: "subscription",
                detail: "pair".to_string()
            }
            .code(),
            "UNIQUE_VIOLATION"
        );
        assert_eq!(
            StoreError::Unavailable("down".to_string()).code(),
            "STORE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found("post", "abc123");
        assert_eq!(err.to_string(), "post not found: abc123");
    }
}
