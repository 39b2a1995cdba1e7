//! GraphQL schema and resolvers for Trellis
//!
//! This module contains the async-graphql schema including:
//! - Query and mutation resolvers over users, profiles, posts and tiers
//! - Per-request relation loaders and the root field planner
//! - The depth guard and the execution frontend that ties them together

pub mod depth;
pub mod errors;
pub mod executor;
pub mod loaders;
pub mod mutation;
pub mod planner;
pub mod query;
pub mod schema;
pub mod types;

pub use depth::{check_depth, DepthViolation};
pub use executor::GraphExecutor;
pub use loaders::Loaders;
pub use schema::{build_schema, TrellisSchema};
