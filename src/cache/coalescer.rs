use std::{
    collections::HashMap,
    fmt::Display,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::Instrument;

use crate::{logging::CatalogEvent, Status};

pub type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, Status>>>;

/// Single-flight registry: at most one fetch per key is in flight and every
/// concurrent caller for that key awaits the same outcome.
pub struct Coalescer<K, V> {
    pending: Arc<Mutex<HashMap<K, SharedFetch<V>>>>,
}

impl<K, V> Default for Coalescer<K, V> {
    fn default() -> Self {
        Coalescer {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Coalescer<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Coalescer::default()
    }

    /// Returns the pending fetch for `key`, or starts `fetch_fn` as the
    /// pending fetch if there is none.
    ///
    /// Lookup and registration happen under one lock acquisition, before
    /// anything is awaited. `fetch_fn` runs on its own task, so once issued
    /// it runs to completion even if every caller goes away. The key is
    /// deregistered as soon as the fetch settles, whether it succeeded or
    /// failed.
    pub fn fetch_once<F, Fut>(&self, key: K, fetch_fn: F) -> SharedFetch<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, Status>> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(fetch) = pending.get(&key) {
            CatalogEvent::coalesced(&key.to_string());
            return fetch.clone();
        }

        let registry = Arc::clone(&self.pending);
        let settled_key = key.clone();
        let task = tokio::spawn(
            async move {
                let result = fetch_fn().await;
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&settled_key);
                result
            }
            .in_current_span(),
        );

        let fetch = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Status::internal(format!("fetch task failed: {e}"))),
            }
        }
        .boxed()
        .shared();

        pending.insert(key, fetch.clone());
        fetch
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
