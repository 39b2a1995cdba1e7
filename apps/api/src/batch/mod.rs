//! Request-scoped batching
//!
//! Resolvers ask a [`Loader`] for one key at a time; the loader collects the
//! keys requested while the current scheduling tick runs and fetches them
//! with a single backend call once the tick drains. Ticks are driven by the
//! [`Scheduler`], which wraps the execution of one request.
//!
//! A fresh scheduler and loader set is created per request and dropped with
//! it, so neither cached values nor open batch windows are ever shared
//! between requests.

mod loader;
mod scheduler;

pub use loader::{BatchFn, Cardinality, LoadError, LoadFuture, Loader, Many, One};
pub use scheduler::{Scheduler, Tick};
