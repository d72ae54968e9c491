//! The per-name bounded concurrent store
//!
//! `BoundedCache` owns the entries for one cache name and implements the
//! whole per-entry lifecycle: lazy expiry with a background sweep,
//! refresh-ahead on aging entries, approximate-LRU size eviction, and
//! single-flight coalescing of concurrent loads. Handles are cheap clones
//! over a shared inner; every operation is safe under concurrent use
//! without external synchronization.

use crate::entry::CacheEntry;
use crate::flight::FlightMap;
use crate::metrics::MetricsRecorder;
use crate::recency::RecencyList;
use crate::stats::{CacheStats, StatsSnapshot};
use coffer_config::CacheConfig;
use coffer_core::{
    Error, LoadFuture, RemovalCause, RemovalEvent, RemovalListener, Result,
};
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Generic bounded store for one cache name
pub struct BoundedCache<K, V> {
    pub(crate) inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for BoundedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct CacheInner<K, V> {
    config: Arc<CacheConfig>,
    entries: DashMap<K, Arc<CacheEntry<V>>>,
    recency: RecencyList<K>,
    flights: FlightMap<K, V>,
    stats: CacheStats,
    listener: RemovalListener<K, V>,
    metrics: Arc<dyn MetricsRecorder>,
    loader_pool: Arc<Semaphore>,
    sweep_handle: RwLock<Option<JoinHandle<()>>>,
}

impl<K, V> Drop for CacheInner<K, V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweep_handle.write().take() {
            handle.abort();
        }
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        config: Arc<CacheConfig>,
        listener: RemovalListener<K, V>,
        metrics: Arc<dyn MetricsRecorder>,
        loader_pool: Arc<Semaphore>,
    ) -> Self {
        let cache = Self {
            inner: Arc::new(CacheInner {
                config,
                entries: DashMap::new(),
                recency: RecencyList::new(),
                flights: FlightMap::new(),
                stats: CacheStats::default(),
                listener,
                metrics,
                loader_pool,
                sweep_handle: RwLock::new(None),
            }),
        };
        cache.start_sweep();
        cache
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Number of entries currently stored, expired-but-unswept included
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Return the live value for `key` without triggering a load
    pub fn get_if_present(&self, key: &K) -> Option<V> {
        let inner = &self.inner;
        match inner.lookup_live(key) {
            Some(entry) => {
                inner.stats.record_hit();
                inner.metrics.record_hit(&inner.config.name);
                inner.recency.touch(key);
                Some(entry.value().clone())
            }
            None => {
                inner.stats.record_miss();
                inner.metrics.record_miss(&inner.config.name);
                None
            }
        }
    }

    /// Return the live value for `key`, loading it through `loader` on a
    /// miss
    ///
    /// Concurrent callers for the same missing key share one loader
    /// invocation and observe its single settled result. A live entry older
    /// than the configured refresh interval is returned as-is while the
    /// loader re-runs in the background.
    pub async fn get_or_load<F>(&self, key: &K, loader: F) -> Result<V>
    where
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        let inner = &self.inner;
        if let Some(entry) = inner.lookup_live(key) {
            inner.stats.record_hit();
            inner.metrics.record_hit(&inner.config.name);
            inner.recency.touch(key);
            if entry.needs_refresh(inner.config.refresh) {
                self.spawn_refresh(key.clone(), loader);
            }
            return Ok(entry.value().clone());
        }

        inner.stats.record_miss();
        inner.metrics.record_miss(&inner.config.name);
        let (flight, started) = inner
            .flights
            .join_or_start(key.clone(), || {
                CacheInner::load_future(inner, key.clone(), loader, false)
            });
        if started {
            // Detached driver: the load completes and publishes its entry
            // even if every awaiting caller is cancelled.
            tokio::spawn(flight.clone());
        }
        flight.await
    }

    /// Invoke `loader` unconditionally, bypassing entries and coalescing
    ///
    /// Still bounded by the loader pool and recorded in load statistics;
    /// the caller decides whether to store the result.
    pub async fn load_direct<F>(&self, key: &K, loader: F) -> Result<V>
    where
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        CacheInner::run_loader(&self.inner, key.clone(), loader).await
    }

    /// Unconditionally store `value`, replacing any previous entry
    pub fn put(&self, key: K, value: V) {
        self.inner.store(key, value, false);
    }

    /// Remove one entry, returning its value
    pub fn invalidate(&self, key: &K) -> Option<V> {
        self.inner.remove_with_cause(key, RemovalCause::Explicit)
    }

    /// Remove every entry, returning how many were removed
    pub fn invalidate_all(&self) -> usize {
        let keys: Vec<K> = self
            .inner
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        let mut removed = 0;
        for key in &keys {
            if self
                .inner
                .remove_with_cause(key, RemovalCause::Explicit)
                .is_some()
            {
                removed += 1;
            }
        }
        removed
    }

    fn spawn_refresh<F>(&self, key: K, loader: F)
    where
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        let inner = &self.inner;
        let log_key = key.clone();
        let (flight, started) = inner.flights.join_or_start(key.clone(), || {
            CacheInner::load_future(inner, key, loader, true)
        });
        if started {
            debug!(
                cache = %inner.config.name,
                key = ?log_key,
                "refreshing stale entry in background"
            );
            tokio::spawn(flight);
        }
    }

    fn start_sweep(&self) {
        let period = self.inner.config.ttl;
        if period.is_zero() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(
                cache = %self.inner.config.name,
                "no runtime at construction, relying on lazy expiry"
            );
            return;
        };
        let weak = Arc::downgrade(&self.inner);
        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                inner.sweep_expired();
            }
        });
        *self.inner.sweep_handle.write() = Some(task);
    }
}

impl<K, V> CacheInner<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Live entry for `key`; an expired entry found on access is reclaimed
    fn lookup_live(&self, key: &K) -> Option<Arc<CacheEntry<V>>> {
        let entry = self.entries.get(key).map(|guard| Arc::clone(guard.value()))?;
        if entry.is_expired(self.config.ttl) {
            self.remove_expired(key);
            return None;
        }
        Some(entry)
    }

    /// Remove `key` only while it is still expired, so a concurrent
    /// refresh's fresh entry is never clobbered
    fn remove_expired(&self, key: &K) {
        let ttl = self.config.ttl;
        if let Some((key, entry)) = self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(ttl))
        {
            self.recency.record_remove(&key);
            self.notify_removal(key, entry.value().clone(), RemovalCause::Expired);
        }
    }

    fn remove_with_cause(&self, key: &K, cause: RemovalCause) -> Option<V> {
        let (key, entry) = self.entries.remove(key)?;
        self.recency.record_remove(&key);
        let value = entry.value().clone();
        self.notify_removal(key, value.clone(), cause);
        Some(value)
    }

    /// Publish `value` under `key`, replacing and notifying any previous
    /// entry, then enforce the size bound
    fn store(&self, key: K, value: V, refresh: bool) {
        let successor = {
            let previous = self.entries.get(&key).map(|guard| Arc::clone(guard.value()));
            match previous {
                Some(old) if refresh => Arc::new(old.refreshed(value)),
                _ => Arc::new(CacheEntry::new(value)),
            }
        };
        let replaced = self.entries.insert(key.clone(), successor);
        self.recency.record_insert(key.clone());
        if let Some(old) = replaced {
            self.notify_removal(key, old.value().clone(), RemovalCause::Replaced);
        }
        self.enforce_bound();
    }

    fn enforce_bound(&self) {
        while self.entries.len() > self.config.max_size {
            let Some(victim) = self.recency.pop_lru() else {
                break;
            };
            if let Some((victim, entry)) = self.entries.remove(&victim) {
                trace!(cache = %self.config.name, key = ?victim, "evicting least recently used entry");
                self.notify_removal(victim, entry.value().clone(), RemovalCause::Size);
            }
        }
    }

    fn sweep_expired(&self) {
        let ttl = self.config.ttl;
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(ttl))
            .map(|entry| entry.key().clone())
            .collect();
        if expired.is_empty() {
            return;
        }
        trace!(cache = %self.config.name, count = expired.len(), "sweeping expired entries");
        for key in &expired {
            self.remove_expired(key);
        }
    }

    fn notify_removal(&self, key: K, value: V, cause: RemovalCause) {
        self.stats.record_removal(cause);
        self.metrics.record_eviction(&self.config.name, cause);
        let event = RemovalEvent { key, value, cause };
        if panic::catch_unwind(AssertUnwindSafe(|| (self.listener)(event))).is_err() {
            warn!(
                cache = %self.config.name,
                cause = %cause,
                "removal listener panicked, continuing"
            );
        }
    }

    /// The in-flight computation published for a miss or refresh
    fn load_future<F>(
        this: &Arc<Self>,
        key: K,
        loader: F,
        refresh: bool,
    ) -> BoxFuture<'static, Result<V>>
    where
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        let inner = Arc::clone(this);
        async move {
            match Self::run_loader(&inner, key.clone(), loader).await {
                Ok(value) => {
                    // Publish before dropping the marker so late joiners
                    // either attach to this flight or hit the fresh entry.
                    inner.store(key.clone(), value.clone(), refresh);
                    inner.flights.settle(&key);
                    Ok(value)
                }
                Err(err) => {
                    inner.flights.settle(&key);
                    Err(err)
                }
            }
        }
        .boxed()
    }

    async fn run_loader<F>(inner: &Arc<Self>, key: K, loader: F) -> Result<V>
    where
        F: FnOnce(K) -> LoadFuture<V> + Send + 'static,
    {
        let _permit = Arc::clone(&inner.loader_pool)
            .acquire_owned()
            .await
            .map_err(|_| Error::runtime("loader pool is closed"))?;
        let started = Instant::now();
        match loader(key.clone()).await {
            Ok(value) => {
                let latency = started.elapsed();
                inner.stats.record_load_success(latency);
                inner
                    .metrics
                    .record_load_success(&inner.config.name, latency);
                Ok(value)
            }
            Err(cause) => {
                let latency = started.elapsed();
                inner.stats.record_load_failure(latency);
                inner
                    .metrics
                    .record_load_failure(&inner.config.name, latency);
                debug!(
                    cache = %inner.config.name,
                    key = ?key,
                    error = %cause,
                    "loader failed"
                );
                Err(Error::load(&inner.config.name, &key, cause))
            }
        }
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("name", &self.inner.config.name)
            .field("entry_count", &self.inner.entries.len())
            .field("max_size", &self.inner.config.max_size)
            .finish()
    }
}
