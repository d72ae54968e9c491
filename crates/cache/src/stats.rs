//! Per-cache statistics
//!
//! Counters are updated with relaxed atomics on every operation so the hot
//! read path never takes a lock; `snapshot` reads them without stopping
//! the world.

use coffer_core::RemovalCause;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Internal cache statistics with atomic counters
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    load_successes: AtomicU64,
    load_failures: AtomicU64,
    load_success_ns: AtomicU64,
    load_failure_ns: AtomicU64,
    expired_evictions: AtomicU64,
    size_evictions: AtomicU64,
    explicit_removals: AtomicU64,
    replacements: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_success(&self, latency: Duration) {
        self.load_successes.fetch_add(1, Ordering::Relaxed);
        self.load_success_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self, latency: Duration) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
        self.load_failure_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_removal(&self, cause: RemovalCause) {
        let counter = match cause {
            RemovalCause::Expired => &self.expired_evictions,
            RemovalCause::Size => &self.size_evictions,
            RemovalCause::Explicit => &self.explicit_removals,
            RemovalCause::Replaced => &self.replacements,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            load_successes: self.load_successes.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            total_load_success_time: Duration::from_nanos(
                self.load_success_ns.load(Ordering::Relaxed),
            ),
            total_load_failure_time: Duration::from_nanos(
                self.load_failure_ns.load(Ordering::Relaxed),
            ),
            expired_evictions: self.expired_evictions.load(Ordering::Relaxed),
            size_evictions: self.size_evictions.load(Ordering::Relaxed),
            explicit_removals: self.explicit_removals.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a cache's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub load_successes: u64,
    pub load_failures: u64,
    pub total_load_success_time: Duration,
    pub total_load_failure_time: Duration,
    pub expired_evictions: u64,
    pub size_evictions: u64,
    pub explicit_removals: u64,
    pub replacements: u64,
}

impl StatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// All removals, across every cause
    pub fn removals(&self) -> u64 {
        self.expired_evictions + self.size_evictions + self.explicit_removals + self.replacements
    }

    pub fn average_load_time(&self) -> Option<Duration> {
        if self.load_successes == 0 {
            return None;
        }
        Some(self.total_load_success_time / self.load_successes as u32)
    }
}
