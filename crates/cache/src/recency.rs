//! Access-order tracking for size eviction

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;

/// Approximate LRU order over live keys
///
/// Reads promote through `try_lock` and skip the update when contended;
/// inserts and removals always take the lock, so the order never loses a
/// key that is still live.
pub(crate) struct RecencyList<K> {
    order: Mutex<LruCache<K, ()>>,
}

impl<K: Hash + Eq> RecencyList<K> {
    pub fn new() -> Self {
        Self {
            order: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Mark a key as most recently used
    pub fn touch(&self, key: &K) {
        let Some(mut order) = self.order.try_lock() else {
            return;
        };
        order.promote(key);
    }

    pub fn record_insert(&self, key: K) {
        self.order.lock().put(key, ());
    }

    pub fn record_remove(&self, key: &K) {
        self.order.lock().pop(key);
    }

    /// Remove and return the least recently used key
    pub fn pop_lru(&self) -> Option<K> {
        self.order.lock().pop_lru().map(|(key, ())| key)
    }

    pub fn clear(&self) {
        self.order.lock().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.lock().len()
    }
}
