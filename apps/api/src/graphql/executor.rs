//! Request execution frontend
//!
//! Every request goes through the same pipeline:
//! 1. Parse the document; a syntax error is the whole response
//! 2. Run the depth guard; violations are the whole response and no
//!    resolver runs
//! 3. Attach a fresh scheduler and loader set to the request
//! 4. Execute the schema, with batch windows closing on scheduler ticks

use async_graphql::{Request, Response, ServerError};

use crate::batch::Scheduler;
use crate::repositories::SharedStore;

use super::depth::check_depth;
use super::loaders::Loaders;
use super::schema::{build_schema, TrellisSchema};

/// Executes GraphQL requests with per-request batching
#[derive(Clone)]
pub struct GraphExecutor {
    schema: TrellisSchema,
    store: SharedStore,
    max_depth: usize,
}

impl GraphExecutor {
    pub fn new(store: SharedStore, max_depth: usize) -> Self {
        Self {
            schema: build_schema(store.clone()),
            store,
            max_depth,
        }
    }

    /// Execute one request
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let mut request = request.into();

        let document = match request.parsed_query() {
            Ok(document) => document,
            Err(err) => {
                tracing::debug!(error = %err.message, "Rejected unparsable query");
                return Response::from_errors(vec![err]);
            }
        };

        let violations = check_depth(document, self.max_depth);
        if !violations.is_empty() {
            tracing::debug!(
                violations = violations.len(),
                max_depth = self.max_depth,
                "Rejected query exceeding depth limit"
            );
            return Response::from_errors(violations.into_iter().map(ServerError::from).collect());
        }

        let scheduler = Scheduler::new();
        let loaders = Loaders::new(self.store.clone(), &scheduler);
        let request = request.data(loaders);

        scheduler.run(self.schema.execute(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::repositories::MemoryStore;

    fn executor(max_depth: usize) -> (GraphExecutor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (GraphExecutor::new(store.clone(), max_depth), store)
    }

    #[tokio::test]
    async fn test_syntax_error_is_single_error() {
        let (executor, store) = executor(5);

        let response = executor.execute("{ users { id ").await;

        assert_eq!(response.errors.len(), 1);
        assert!(response.data == async_graphql::Value::Null);
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_depth_violation_skips_execution() {
        let (executor, store) = executor(1);

        let response = executor.execute("{ users { posts { title } } }").await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(
            response.errors[0].message,
            "'anonymous' exceeds maximum operation depth of 1"
        );
        assert!(response.data == async_graphql::Value::Null);
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_query_executes() {
        let (executor, _) = executor(5);

        let response = executor.execute("{ memberTypes { id discount } }").await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["memberTypes"].as_array().map(Vec::len), Some(2));
    }
}
