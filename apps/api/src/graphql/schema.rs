//! GraphQL schema builder for Trellis
//!
//! The schema holds only the store. Loaders are per request and attached by
//! the executor, never stored on the schema.

use async_graphql::{EmptySubscription, Schema};

use crate::repositories::SharedStore;

use super::mutation::Mutation;
use super::query::Query;

/// The Trellis GraphQL schema type
pub type TrellisSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create the GraphQL schema over `store`
pub fn build_schema(store: SharedStore) -> TrellisSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(store)
        .finish()
}
