//! HTTP route handlers for the Trellis API
//!
//! This module contains all HTTP endpoints:
//! - The GraphQL endpoint and its playground
//! - Health check and readiness endpoints

pub mod graphql;
pub mod health;

pub use graphql::graphql_router;
pub use health::{health_router, HealthState};

use axum::{http::Uri, Router};

use crate::error::ApiError;
use crate::graphql::GraphExecutor;

/// Assemble the application router without transport layers
pub fn api_router(executor: GraphExecutor, health_state: HealthState) -> Router {
    Router::new()
        .route("/", axum::routing::get(root))
        .merge(graphql_router(executor))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health_state))
        .fallback(not_found)
}

async fn root() -> &'static str {
    "Trellis GraphQL API"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("route", uri.path())
}
