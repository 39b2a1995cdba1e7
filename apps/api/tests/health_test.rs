//! Integration tests for the HTTP surface
//!
//! Drives the assembled router (health routes, GraphQL endpoint, fallback)
//! over an in-memory store.

mod common;

use std::sync::Arc;

use axum::{http::StatusCode, Router};
use serde_json::json;

use common::*;
use trellis_api::config::StoreBackend;
use trellis_api::repositories::MemoryStore;
use trellis_api::routes::{api_router, HealthState};
use trellis_api::GraphExecutor;

/// Create the full router over a fresh memory store
fn create_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let executor = GraphExecutor::new(store.clone(), TEST_MAX_DEPTH);
    let health = HealthState::new(store.clone(), StoreBackend::Memory);
    (api_router(executor, health), store)
}

fn json_body(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = create_test_app();

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Trellis"));
}

#[tokio::test]
async fn test_simple_health_check() {
    let (app, _) = create_test_app();

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_liveness_probe() {
    let (app, store) = create_test_app();
    store.fail("ping");

    let (status, body) = get(app, "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["status"], "alive");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_probe_follows_store() {
    let (app, store) = create_test_app();

    let (status, body) = get(app.clone(), "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["store"], "memory");

    store.fail("ping");
    let (status, body) = get(app, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(&body)["code"], "DATABASE_UNAVAILABLE");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = create_test_app();

    let (status, body) = get(app, "/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_graphql_endpoint() {
    let (app, _) = create_test_app();

    let (status, body) = post_graphql(app, json!({ "query": "{ memberTypes { id } }" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        expect_data(&body)["memberTypes"],
        json!([{ "id": "BASIC" }, { "id": "BUSINESS" }])
    );
}

#[tokio::test]
async fn test_graphql_endpoint_reports_depth_violation() {
    let (app, store) = create_test_app();
    store.reset_calls();

    let (status, body) = post_graphql(
        app,
        json!({
            "query": "query Deep { users { userSubscribedTo { userSubscribedTo { userSubscribedTo { userSubscribedTo { posts { id } } } } } } }"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(error_codes(&body), vec!["DEPTH_LIMIT_EXCEEDED"]);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_playground_served() {
    let (app, _) = create_test_app();

    let (status, body) = get(app, "/graphql/playground").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());
}
