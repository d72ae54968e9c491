//! Named multi-cache engine for coffer
//!
//! This crate provides a registry of independently configured, type-generic
//! caches with features like:
//! - Bounded storage with approximate-LRU eviction
//! - Time-based expiry with lazy reclamation and a background sweep
//! - Refresh-ahead (stale-while-revalidate) on aging entries
//! - Single-flight coalescing of concurrent loads per key
//! - Stale-value fallback when a fresh computation fails
//! - Blocking and non-blocking access facades

pub mod blocking;
pub mod bounded;
pub mod entry;
pub mod metrics;
pub mod ops;
pub mod registry;
pub mod stats;
pub mod types;

mod flight;
mod recency;

// Re-export the public surface
pub use blocking::BlockingCacheOps;
pub use bounded::BoundedCache;
pub use entry::CacheEntry;
pub use metrics::{MetricsRecorder, NoopMetrics};
pub use ops::CacheOps;
pub use registry::{CacheRegistry, CacheRegistryBuilder, ErasedCache};
pub use stats::{CacheStats, StatsSnapshot};
pub use types::{CacheFlags, Invalidated};

// Re-export the collaborating crates' surface for single-import embedding
pub use coffer_config::{CacheConfig, CacheConfigResolver, ConfigSource, EnvSource, StaticSource};
pub use coffer_core::{
    noop_listener, BoxError, Error, LoadFuture, LoadResult, RemovalCause, RemovalEvent,
    RemovalListener, Result,
};
