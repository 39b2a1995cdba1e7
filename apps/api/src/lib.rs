//! Trellis API library
//!
//! This module exposes the core API components for use in integration tests
//! and as a library.

pub mod batch;
pub mod config;
pub mod error;
pub mod graphql;
pub mod models;
pub mod repositories;
pub mod routes;

mod sync;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use graphql::GraphExecutor;
pub use repositories::{MemoryStore, PgStore, SharedStore, Store, StoreError};
