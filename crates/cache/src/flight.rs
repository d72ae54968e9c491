//! Single-flight load coalescing
//!
//! At most one load runs per key; callers arriving while it is in flight
//! attach to the shared future and observe the same settled result,
//! including failure.

use coffer_core::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::hash::Hash;

/// Shared handle to the in-flight load for one key
pub(crate) type SharedLoad<V> = Shared<BoxFuture<'static, Result<V>>>;

pub(crate) struct FlightMap<K, V> {
    flights: DashMap<K, SharedLoad<V>>,
}

impl<K, V> FlightMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            flights: DashMap::new(),
        }
    }

    /// Attach to the in-flight load for `key`, or publish one built by
    /// `make`
    ///
    /// Returns the shared future and whether this caller started it. `make`
    /// runs under the shard lock and must only construct the future.
    pub fn join_or_start<F>(&self, key: K, make: F) -> (SharedLoad<V>, bool)
    where
        F: FnOnce() -> BoxFuture<'static, Result<V>>,
    {
        match self.flights.entry(key) {
            Entry::Occupied(flight) => (flight.get().clone(), false),
            Entry::Vacant(slot) => {
                let flight = make().shared();
                slot.insert(flight.clone());
                (flight, true)
            }
        }
    }

    /// Drop the marker once a load has settled
    pub fn settle(&self, key: &K) {
        self.flights.remove(key);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.flights.len()
    }
}
