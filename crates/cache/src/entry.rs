//! In-memory cache entries

use std::time::{Duration, Instant};

/// A single immutable cache entry
///
/// Entries are replaced wholesale on refresh or overwrite; the engine never
/// mutates a published entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_refreshed_at: Instant,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V) -> Self {
        let now = Instant::now();
        Self {
            value,
            inserted_at: now,
            last_refreshed_at: now,
        }
    }

    /// Successor entry for a refreshed value, keeping the original
    /// insertion time
    pub(crate) fn refreshed(&self, value: V) -> Self {
        Self {
            value,
            inserted_at: self.inserted_at,
            last_refreshed_at: Instant::now(),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn inserted_at(&self) -> Instant {
        self.inserted_at
    }

    pub fn last_refreshed_at(&self) -> Instant {
        self.last_refreshed_at
    }

    /// Age since the last write
    pub fn age(&self) -> Duration {
        self.last_refreshed_at.elapsed()
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Whether a read should dispatch a background reload
    pub fn needs_refresh(&self, refresh: Option<Duration>) -> bool {
        match refresh {
            Some(interval) => self.age() > interval,
            None => false,
        }
    }
}
