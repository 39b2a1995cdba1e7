//! Health check HTTP route handlers
//!
//! Provides endpoints for checking the health of the API and its store:
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/ready` - Readiness check (pings the store)
//! - `GET /health/live` - Kubernetes-style liveness probe

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::config::StoreBackend;
use crate::error::{ApiError, ApiResult};
use crate::repositories::SharedStore;

/// Shared application state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    /// Store checked by the readiness probe
    pub store: SharedStore,
    /// Configured backend, reported by the readiness probe
    pub backend: StoreBackend,
}

impl HealthState {
    pub fn new(store: SharedStore, backend: StoreBackend) -> Self {
        Self { store, backend }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_probe))
        .route("/ready", get(readiness_probe))
        .with_state(state)
}

/// Simple health check - always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness probe for Kubernetes
///
/// Returns 200 if the server process is running and can handle requests.
/// This should NOT check the store - that's what readiness is for.
async fn liveness_probe() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe - checks the store
///
/// # Response
/// - 200 OK if the store answers
/// - 503 Service Unavailable otherwise
async fn readiness_probe(State(state): State<HealthState>) -> ApiResult<impl IntoResponse> {
    let started = std::time::Instant::now();

    state.store.ping().await.map_err(|e| {
        tracing::warn!(error = %e, backend = %state.backend, "Store ping failed");
        ApiError::DatabaseUnavailable
    })?;

    Ok(Json(serde_json::json!({
        "status": "ready",
        "store": state.backend.to_string(),
        "latency_ms": started.elapsed().as_millis() as u64,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::Arc;

    use crate::repositories::MemoryStore;

    #[tokio::test]
    async fn test_simple_health() {
        let response = simple_health().await;
        assert_eq!(response, "OK");
    }

    #[tokio::test]
    async fn test_liveness_probe() {
        let response = liveness_probe().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reflects_store() {
        let store = Arc::new(MemoryStore::new());
        let state = HealthState::new(store.clone(), StoreBackend::Memory);

        let ready = readiness_probe(State(state.clone())).await.into_response();
        assert_eq!(ready.status(), StatusCode::OK);

        store.fail("ping");
        let unready = readiness_probe(State(state)).await.into_response();
        assert_eq!(unready.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
