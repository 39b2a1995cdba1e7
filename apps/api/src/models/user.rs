//! User model for Trellis
//!
//! Besides the plain `users` row this module holds the shapes used by the
//! eager-joined root fetch: which relations to join and the joined result.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Profile, SubscribedUser};

/// User record from the users table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Account balance
    pub balance: f64,
}

/// User creation input
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub balance: f64,
}

/// Partial user update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

/// Relations to join inline with a root user fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserIncludes {
    /// Join the user's profile
    pub profile: bool,
    /// Join the authors the user subscribes to
    pub subscribed_to: bool,
    /// Join the users subscribed to this user
    pub subscribers: bool,
}

impl UserIncludes {
    /// True when no relation is requested
    pub fn is_empty(&self) -> bool {
        !(self.profile || self.subscribed_to || self.subscribers)
    }
}

/// A user together with the relations requested through [`UserIncludes`]
///
/// Each slot is `Some` exactly when its relation was joined. A joined
/// profile slot holds `Some(None)` for a user without a profile.
#[derive(Debug, Clone, Default)]
pub struct UserGraph {
    pub user: User,
    pub profile: Option<Option<Profile>>,
    pub subscribed_to: Option<Vec<SubscribedUser>>,
    pub subscribers: Option<Vec<SubscribedUser>>,
}

impl UserGraph {
    /// Wrap a user with no joined relations
    pub fn bare(user: User) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            balance: 0.0,
        }
    }
}
