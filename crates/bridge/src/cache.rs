//! Lazily loaded URL resolution indexes.
//!
//! Each index is loaded as a whole from upstream on first use and dropped on
//! any write through the bridge. There is no TTL; an index stays until it is
//! invalidated.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;

use crate::upstream::UpstreamError;

/// A single, all-or-nothing resolution index.
///
/// Concurrent first uses share one load. A failed load leaves the cache
/// empty, so the next use retries.
#[derive(Clone)]
pub struct ResolutionCache<V> {
    name: &'static str,
    cache: Cache<(), Arc<V>>,
}

impl<V> ResolutionCache<V>
where
    V: Send + Sync + 'static,
{
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cache: Cache::builder().max_capacity(1).build(),
        }
    }

    /// The cached index, loading it with `load` if absent.
    ///
    /// # Errors
    ///
    /// Returns the load failure; every caller waiting on the same load gets it.
    pub async fn get_or_load<F>(&self, load: F) -> Result<Arc<V>, UpstreamError>
    where
        F: Future<Output = Result<V, UpstreamError>> + Send,
    {
        let name = self.name;
        self.cache
            .try_get_with((), async move {
                tracing::debug!(cache = name, "Loading resolution index");
                load.await.map(Arc::new)
            })
            .await
            .map_err(UpstreamError::from)
    }

    /// Replace the index with a freshly fetched one.
    pub async fn replace(&self, value: V) {
        self.cache.insert((), Arc::new(value)).await;
    }

    /// Drop the index; the next read reloads it.
    pub fn invalidate(&self) {
        tracing::debug!(cache = self.name, "Invalidating resolution index");
        self.cache.invalidate_all();
    }

    /// The cached index, without loading.
    #[cfg(test)]
    pub async fn peek(&self) -> Option<Arc<V>> {
        self.cache.get(&()).await
    }
}
