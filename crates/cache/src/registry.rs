//! Name-keyed registry of independently configured caches
//!
//! The registry owns every `BoundedCache` and guarantees exactly one cache
//! per name: concurrent first-time requests construct a single instance,
//! and every caller observes it fully initialized. Caches of different
//! key/value types share the registry behind a small type-erased boundary;
//! typed access recovers the concrete cache by downcast.

use crate::bounded::BoundedCache;
use crate::metrics::{MetricsRecorder, NoopMetrics};
use crate::stats::StatsSnapshot;
use coffer_config::{CacheConfigResolver, ConfigSource};
use coffer_core::{Error, RemovalListener, Result};
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Type-erased view of a named cache
pub trait ErasedCache: Send + Sync {
    fn cache_name(&self) -> &str;
    fn entry_count(&self) -> usize;
    fn invalidate_all(&self) -> usize;
    fn stats(&self) -> StatsSnapshot;
    fn as_any(&self) -> &dyn Any;
}

impl<K, V> ErasedCache for BoundedCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn cache_name(&self) -> &str {
        self.name()
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn invalidate_all(&self) -> usize {
        BoundedCache::invalidate_all(self)
    }

    fn stats(&self) -> StatsSnapshot {
        BoundedCache::stats(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Owner of every named cache; one instance per embedding service
pub struct CacheRegistry {
    caches: DashMap<String, Arc<dyn ErasedCache>>,
    resolver: CacheConfigResolver,
    metrics: Arc<dyn MetricsRecorder>,
    loader_pool: Arc<Semaphore>,
}

impl CacheRegistry {
    pub fn builder() -> CacheRegistryBuilder {
        CacheRegistryBuilder::new()
    }

    /// Resolve or lazily construct the cache for `name`
    ///
    /// Exactly one cache is built per name; the listener supplied by the
    /// creating caller is installed for the cache's lifetime, and later
    /// listeners for the same name are ignored.
    pub fn get_or_create<K, V>(
        &self,
        name: &str,
        listener: RemovalListener<K, V>,
    ) -> Result<BoundedCache<K, V>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let erased = self
            .caches
            .entry(name.to_string())
            .or_insert_with(|| {
                let config = self.resolver.resolve(name);
                debug!(
                    cache = %name,
                    ttl_ms = config.ttl.as_millis() as u64,
                    max_size = config.max_size,
                    "creating cache"
                );
                Arc::new(BoundedCache::<K, V>::new(
                    config,
                    listener,
                    Arc::clone(&self.metrics),
                    Arc::clone(&self.loader_pool),
                )) as Arc<dyn ErasedCache>
            })
            .clone();
        Self::downcast(name, &erased)
    }

    /// The typed cache for `name`, if one exists
    pub fn lookup<K, V>(&self, name: &str) -> Result<Option<BoundedCache<K, V>>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match self.caches.get(name) {
            Some(erased) => Self::downcast(name, erased.value()).map(Some),
            None => Ok(None),
        }
    }

    /// The type-erased cache for `name`, if one exists
    pub fn erased(&self, name: &str) -> Option<Arc<dyn ErasedCache>> {
        self.caches.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Detach and return the cache registered under `name`
    ///
    /// A later `get_or_create` for the same name builds a brand-new cache.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn ErasedCache>> {
        self.caches.remove(name).map(|(_, cache)| cache)
    }

    pub fn cache_names(&self) -> Vec<String> {
        self.caches.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn stats(&self, name: &str) -> Option<StatsSnapshot> {
        self.caches.get(name).map(|entry| entry.value().stats())
    }

    fn downcast<K, V>(name: &str, erased: &Arc<dyn ErasedCache>) -> Result<BoundedCache<K, V>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        erased
            .as_any()
            .downcast_ref::<BoundedCache<K, V>>()
            .cloned()
            .ok_or_else(|| Error::type_mismatch(name))
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("caches", &self.caches.len())
            .finish()
    }
}

/// Builder for [`CacheRegistry`]
pub struct CacheRegistryBuilder {
    source: Option<Arc<dyn ConfigSource>>,
    metrics: Option<Arc<dyn MetricsRecorder>>,
    loader_permits: Option<usize>,
}

impl CacheRegistryBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            metrics: None,
            loader_permits: None,
        }
    }

    pub fn with_config_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Override the loader-pool bound; defaults to
    /// `max(available_parallelism - 1, 4)`
    pub fn with_loader_permits(mut self, permits: usize) -> Self {
        self.loader_permits = Some(permits);
        self
    }

    pub fn build(self) -> CacheRegistry {
        let resolver = match self.source {
            Some(source) => CacheConfigResolver::new(source),
            None => CacheConfigResolver::without_source(),
        };
        let permits = self.loader_permits.unwrap_or_else(default_loader_permits);
        CacheRegistry {
            caches: DashMap::new(),
            resolver,
            metrics: self
                .metrics
                .unwrap_or_else(|| Arc::new(NoopMetrics)),
            loader_pool: Arc::new(Semaphore::new(permits)),
        }
    }
}

impl Default for CacheRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Loader pool bound: leave one core for the caller's own work, never
/// fewer than four permits
fn default_loader_permits() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.saturating_sub(1).max(4)
}
