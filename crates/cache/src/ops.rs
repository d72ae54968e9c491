//! Non-blocking access facade
//!
//! `CacheOps` implements the access-pattern policy (get-or-compute,
//! skip-cache, fallback-on-error, invalidation) once, against the async
//! engine. The blocking facade delegates here rather than duplicating the
//! policy.

use crate::registry::CacheRegistry;
use crate::types::{CacheFlags, Invalidated};
use coffer_core::{LoadFuture, RemovalListener, Result};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::warn;

/// Non-blocking facade over a [`CacheRegistry`]
#[derive(Clone)]
pub struct CacheOps {
    registry: Arc<CacheRegistry>,
}

impl CacheOps {
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    /// Get-or-load with optional skip-cache write-through
    ///
    /// With skip-cache in effect the loader always runs and its result is
    /// written through, keeping the cache warm for later non-skip reads.
    pub async fn get_or_compute<K, V, F>(
        &self,
        name: &str,
        key: K,
        loader: F,
        listener: RemovalListener<K, V>,
        flags: CacheFlags,
    ) -> Result<V>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        let cache = self.registry.get_or_create::<K, V>(name, listener)?;
        if flags.resolve_skip(cache.config().skip_cache_default) {
            let value = cache.load_direct(&key, loader).await?;
            cache.put(key, value.clone());
            return Ok(value);
        }
        cache.get_or_load(&key, loader).await
    }

    /// Always recompute; fall back to the last cached value on failure
    ///
    /// The loader failure is re-raised only when no previously cached value
    /// exists.
    pub async fn compute_with_fallback<K, V, F>(
        &self,
        name: &str,
        key: K,
        loader: F,
        listener: RemovalListener<K, V>,
    ) -> Result<V>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        let cache = self.registry.get_or_create::<K, V>(name, listener)?;
        match cache.load_direct(&key, loader).await {
            Ok(value) => {
                cache.put(key, value.clone());
                Ok(value)
            }
            Err(err) => match cache.get_if_present(&key) {
                Some(stale) => {
                    warn!(
                        cache = %name,
                        key = ?key,
                        error = %err,
                        "fresh computation failed, serving last cached value"
                    );
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// Drop the whole named cache; `true` when one existed
    pub fn clear(&self, name: &str) -> bool {
        self.registry.remove(name).is_some()
    }

    /// Invalidate one key, or every entry when `key` is `None`
    ///
    /// Never constructs a cache as a side effect.
    pub fn invalidate<K, V>(&self, name: &str, key: Option<&K>) -> Result<Invalidated<V>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match key {
            Some(key) => {
                let removed = match self.registry.lookup::<K, V>(name)? {
                    Some(cache) => cache.invalidate(key),
                    None => None,
                };
                Ok(Invalidated::Entry(removed))
            }
            None => {
                if let Some(cache) = self.registry.erased(name) {
                    cache.invalidate_all();
                }
                Ok(Invalidated::Cache(name.to_string()))
            }
        }
    }
}

impl fmt::Debug for CacheOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOps")
            .field("registry", &self.registry)
            .finish()
    }
}
