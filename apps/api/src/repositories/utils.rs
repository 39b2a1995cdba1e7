//! Shared utility functions for the Postgres store
//!
//! This module provides the column lists and error mapping used across
//! queries.

use super::StoreError;

// ============================================================================
// SQL Column Constants
//
// These constants define the SELECT column lists for each entity type,
// keeping `FromRow` decoding consistent across queries.
// ============================================================================

/// SQL columns for user queries
pub const USER_COLUMNS: &str = "id, name, balance";

/// SQL columns for profile queries
pub const PROFILE_COLUMNS: &str = "id, is_male, year_of_birth, user_id, member_type_id";

/// SQL columns for post queries
pub const POST_COLUMNS: &str = "id, title, content, author_id";

/// SQL columns for member type queries
pub const MEMBER_TYPE_COLUMNS: &str = "id, discount, posts_limit_per_month";

/// SQL columns for an edge joined with the user on its far side (aliased `u`)
pub const SUBSCRIBED_USER_COLUMNS: &str = "s.subscriber_id, s.author_id, u.id, u.name, u.balance";

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a sqlx error to a store error, recognising constraint violations
pub fn map_db_error(entity: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let detail = db_err.message().to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { entity, detail },
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::ForeignKeyViolation { entity, detail }
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribed_user_columns_cover_edge_and_user() {
        for column in ["subscriber_id", "author_id", "u.id", "u.name", "u.balance"] {
            assert!(SUBSCRIBED_USER_COLUMNS.contains(column));
        }
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_db_error("user", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
