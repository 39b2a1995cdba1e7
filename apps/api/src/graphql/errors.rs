//! GraphQL error conversion
//!
//! Store and batch failures surface as field errors carrying a `code`
//! extension. Database driver errors are logged and replaced by a generic
//! message so SQL details never reach clients.

use async_graphql::{Error, ErrorExtensions};

use crate::batch::LoadError;
use crate::repositories::StoreError;

impl ErrorExtensions for StoreError {
    fn extend(&self) -> Error {
        let message = match self {
            StoreError::Database(err) => {
                tracing::error!(error = %err, "Database error in resolver");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        let code = self.code();
        Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

impl ErrorExtensions for LoadError {
    fn extend(&self) -> Error {
        self.store_error().extend()
    }
}
