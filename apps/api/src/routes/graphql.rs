//! GraphQL HTTP endpoint
//!
//! - `POST /graphql` - Execute a `{query, variables, operationName}` request
//! - `GET /graphql/playground` - GraphQL Playground for development

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};

use crate::graphql::GraphExecutor;

/// Create the GraphQL router
pub fn graphql_router(executor: GraphExecutor) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
        .with_state(executor)
}

/// Execute one GraphQL request
///
/// The executor parses the document, applies the depth guard and runs the
/// request with its own loader set. Errors of every kind come back inside
/// the GraphQL response envelope with status 200.
async fn graphql_handler(
    State(executor): State<GraphExecutor>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    executor.execute(req.into_inner()).await.into()
}

/// GraphQL Playground handler for development
async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}
