//! Blocking access facade
//!
//! `BlockingCacheOps` owns a small private runtime and drives the async
//! policy to completion on the calling thread. The runtime keeps background
//! refresh-ahead loads progressing between calls. Construction is rejected
//! from async context; callers already inside a runtime use [`CacheOps`].

use crate::ops::CacheOps;
use crate::registry::CacheRegistry;
use crate::types::{CacheFlags, Invalidated};
use coffer_core::{BoxError, Error, LoadFuture, LoadResult, RemovalListener, Result};
use futures::FutureExt;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Blocking facade over a [`CacheRegistry`]
pub struct BlockingCacheOps {
    ops: CacheOps,
    runtime: tokio::runtime::Runtime,
}

impl BlockingCacheOps {
    pub fn new(registry: Arc<CacheRegistry>) -> Result<Self> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::runtime(
                "cannot construct the blocking facade from async context, use CacheOps instead",
            ));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("coffer-cache")
            .enable_all()
            .build()
            .map_err(|e| Error::runtime(format!("failed to create cache runtime: {e}")))?;
        Ok(Self {
            ops: CacheOps::new(registry),
            runtime,
        })
    }

    /// Blocking form of [`CacheOps::get_or_compute`]
    pub fn get_or_compute<K, V, F>(
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
        F: FnOnce(K) -> LoadResult<V> + Send + 'static,
    {
        self.runtime.block_on(self.ops.get_or_compute(
            name,
            key,
            bridge_loader(loader),
            listener,
            flags,
        ))
    }

    /// Blocking form of [`CacheOps::compute_with_fallback`]
    pub fn compute_with_fallback<K, V, F>(
        &self,
        name: &str,
        key: K,
        loader: F,
        listener: RemovalListener<K, V>,
    ) -> Result<V>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: FnOnce(K) -> LoadResult<V> + Send + 'static,
    {
        self.runtime.block_on(self.ops.compute_with_fallback(
            name,
            key,
            bridge_loader(loader),
            listener,
        ))
    }

    /// Drop the whole named cache; `true` when one existed
    pub fn clear(&self, name: &str) -> bool {
        self.ops.clear(name)
    }

    /// Invalidate one key, or every entry when `key` is `None`
    pub fn invalidate<K, V>(&self, name: &str, key: Option<&K>) -> Result<Invalidated<V>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.ops.invalidate(name, key)
    }
}

impl fmt::Debug for BlockingCacheOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingCacheOps")
            .field("ops", &self.ops)
            .finish()
    }
}

/// Bridge a synchronous loader onto the blocking pool so it never stalls a
/// runtime worker
fn bridge_loader<K, V, F>(loader: F) -> impl FnOnce(K) -> LoadFuture<V> + Send + 'static
where
    K: Send + 'static,
    V: Send + 'static,
    F: FnOnce(K) -> LoadResult<V> + Send + 'static,
{
    move |key: K| {
        async move {
            match tokio::task::spawn_blocking(move || loader(key)).await {
                Ok(result) => result,
                Err(join_err) => Err(Box::new(join_err) as BoxError),
            }
        }
        .boxed()
    }
}
