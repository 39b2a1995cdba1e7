//! Key-batched loader with a request-scoped cache
//!
//! `load` returns a shared future for the key's value. On a cache miss the
//! key joins the loader's open batch window and the still-pending future is
//! cached, so every later `load` of that key (in this window or after it)
//! resolves from the same entry. When the scheduler closes the window the
//! loader issues one backend call with the window's keys in first-seen
//! order and resolves each key from the grouped response.
//!
//! The cache never evicts on its own. Entries go away through `clear`,
//! `clear_all`, or when their batch fails, so a later `load` retries.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, Weak};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use thiserror::Error;

use crate::sync::lock;
use super::scheduler::{Gate, Scheduler};
use crate::repositories::{StoreError, StoreResult};

/// Backend call serving one relation kind
pub trait BatchFn: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Send + Sync + 'static;
    type Record: Clone + Send + Sync + 'static;

    /// Loader name used in logs
    const NAME: &'static str;

    /// Key a returned record was matched on
    fn key_of(record: &Self::Record) -> Self::Key;

    /// Fetch records for `keys`; order and completeness are not required
    fn fetch(
        &self,
        keys: &[Self::Key],
    ) -> impl Future<Output = StoreResult<Vec<Self::Record>>> + Send;
}

/// How records for one key fold into the value returned by `load`
pub trait Cardinality<R>: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    /// Value of a key with no matching record
    fn absent() -> Self::Value;

    fn collect(value: &mut Self::Value, record: R);
}

/// Single-valued relation: `Option<R>`, `None` when absent
pub struct One;

/// Multi-valued relation: `Vec<R>`, empty when absent
pub struct Many;

impl<R: Clone + Send + Sync + 'static> Cardinality<R> for One {
    type Value = Option<R>;

    fn absent() -> Self::Value {
        None
    }

    fn collect(value: &mut Self::Value, record: R) {
        if value.is_none() {
            *value = Some(record);
        }
    }
}

impl<R: Clone + Send + Sync + 'static> Cardinality<R> for Many {
    type Value = Vec<R>;

    fn absent() -> Self::Value {
        Vec::new()
    }

    fn collect(value: &mut Self::Value, record: R) {
        value.push(record);
    }
}

/// Failure of a batch, shared by every key of its window
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct LoadError(Arc<StoreError>);

impl LoadError {
    /// The store error that failed the batch
    pub fn store_error(&self) -> &StoreError {
        &self.0
    }
}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        Self(Arc::new(err))
    }
}

/// Pending or settled value of one key
pub type LoadFuture<V> = Shared<BoxFuture<'static, Result<V, LoadError>>>;

type BatchFuture<K, V> = Shared<BoxFuture<'static, Result<Arc<HashMap<K, V>>, LoadError>>>;

struct CacheEntry<V> {
    value: LoadFuture<V>,
    /// Window that fetches the value; `None` for primed entries
    window: Option<u64>,
}

struct Window<K, V> {
    id: u64,
    keys: Vec<K>,
    batch: BatchFuture<K, V>,
}

struct State<K, V> {
    cache: HashMap<K, CacheEntry<V>>,
    window: Option<Window<K, V>>,
    next_window: u64,
}

/// Loader for one relation kind, scoped to one request
pub struct Loader<F: BatchFn, C: Cardinality<F::Record>> {
    batch_fn: Arc<F>,
    scheduler: Scheduler,
    state: Arc<Mutex<State<F::Key, C::Value>>>,
    _cardinality: PhantomData<fn() -> C>,
}

impl<F: BatchFn, C: Cardinality<F::Record>> Loader<F, C> {
    pub fn new(batch_fn: F, scheduler: &Scheduler) -> Self {
        Self {
            batch_fn: Arc::new(batch_fn),
            scheduler: scheduler.clone(),
            state: Arc::new(Mutex::new(State {
                cache: HashMap::new(),
                window: None,
                next_window: 0,
            })),
            _cardinality: PhantomData,
        }
    }

    /// Value for `key`, from the cache or the next batch
    ///
    /// The key is registered when this is called, not when the returned
    /// future is first polled.
    pub fn load(&self, key: F::Key) -> LoadFuture<C::Value> {
        let mut state = lock(&self.state);
        if let Some(entry) = state.cache.get(&key) {
            return entry.value.clone();
        }

        let (window_id, batch) = self.join_window(&mut state, key.clone());
        let lookup = key.clone();
        let value = batch
            .map(move |result| {
                result.map(|values| values.get(&lookup).cloned().unwrap_or_else(C::absent))
            })
            .boxed()
            .shared();

        state.cache.insert(
            key,
            CacheEntry {
                value: value.clone(),
                window: Some(window_id),
            },
        );
        value
    }

    /// Values for `keys`, in the order given
    pub fn load_many<I>(
        &self,
        keys: I,
    ) -> impl Future<Output = Result<Vec<C::Value>, LoadError>> + Send + 'static
    where
        I: IntoIterator<Item = F::Key>,
    {
        let pending: Vec<_> = keys.into_iter().map(|key| self.load(key)).collect();
        future::try_join_all(pending)
    }

    /// Cache `value` for `key` without a backend call
    ///
    /// Returns false, leaving the cache untouched, when the key is already
    /// cached or pending.
    pub fn prime(&self, key: F::Key, value: C::Value) -> bool {
        match lock(&self.state).cache.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry {
                    value: future::ready(Ok(value)).boxed().shared(),
                    window: None,
                });
                true
            }
        }
    }

    /// Evict `key`; returns whether it was cached
    pub fn clear(&self, key: &F::Key) -> bool {
        lock(&self.state).cache.remove(key).is_some()
    }

    /// Evict every cached key
    pub fn clear_all(&self) {
        lock(&self.state).cache.clear();
    }

    /// Whether `key` is cached, settled or pending
    pub fn is_cached(&self, key: &F::Key) -> bool {
        lock(&self.state).cache.contains_key(key)
    }

    /// Add `key` to the open window, opening one if needed
    fn join_window(
        &self,
        state: &mut State<F::Key, C::Value>,
        key: F::Key,
    ) -> (u64, BatchFuture<F::Key, C::Value>) {
        if let Some(window) = state.window.as_mut() {
            window.keys.push(key);
            return (window.id, window.batch.clone());
        }

        let id = state.next_window;
        state.next_window += 1;

        let batch = dispatch::<F, C>(
            self.batch_fn.clone(),
            Arc::downgrade(&self.state),
            id,
            self.scheduler.open_gate(),
        )
        .boxed()
        .shared();

        state.window = Some(Window {
            id,
            keys: vec![key],
            batch: batch.clone(),
        });
        (id, batch)
    }
}

/// Wait for the tick to drain, then fetch the window's keys in one call
async fn dispatch<F, C>(
    batch_fn: Arc<F>,
    state: Weak<Mutex<State<F::Key, C::Value>>>,
    window_id: u64,
    gate: Arc<Gate>,
) -> Result<Arc<HashMap<F::Key, C::Value>>, LoadError>
where
    F: BatchFn,
    C: Cardinality<F::Record>,
{
    gate.wait().await;

    // Loader dropped with its request: nobody is left to serve.
    let Some(state) = state.upgrade() else {
        return Ok(Arc::new(HashMap::new()));
    };

    let keys = {
        let mut guard = lock(&state);
        match guard.window.take() {
            Some(window) if window.id == window_id => window.keys,
            other => {
                guard.window = other;
                Vec::new()
            }
        }
    };

    if keys.is_empty() {
        return Ok(Arc::new(HashMap::new()));
    }

    tracing::debug!(loader = F::NAME, keys = keys.len(), "dispatching batch");

    match batch_fn.fetch(&keys).await {
        Ok(records) => Ok(Arc::new(group::<F, C>(records))),
        Err(err) => {
            tracing::warn!(
                loader = F::NAME,
                keys = keys.len(),
                error = %err,
                "batch failed"
            );
            lock(&state)
                .cache
                .retain(|_, entry| entry.window != Some(window_id));
            Err(LoadError::from(err))
        }
    }
}

fn group<F, C>(records: Vec<F::Record>) -> HashMap<F::Key, C::Value>
where
    F: BatchFn,
    C: Cardinality<F::Record>,
{
    let mut grouped: HashMap<F::Key, C::Value> = HashMap::new();
    for record in records {
        let value = grouped.entry(F::key_of(&record)).or_insert_with(C::absent);
        C::collect(value, record);
    }
    grouped
}
