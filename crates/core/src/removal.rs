//! Removal events delivered to caller-supplied listeners

use std::fmt;
use std::sync::Arc;

/// Why an entry left a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// The entry outlived its time-to-live
    Expired,
    /// The entry was least recently used when the cache exceeded its bound
    Size,
    /// The entry was invalidated by a caller
    Explicit,
    /// The entry was overwritten by a newer value
    Replaced,
}

impl RemovalCause {
    /// Stable label for logs and metric dimensions
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Size => "size",
            Self::Explicit => "explicit",
            Self::Replaced => "replaced",
        }
    }
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single eviction/removal notification
#[derive(Debug, Clone)]
pub struct RemovalEvent<K, V> {
    pub key: K,
    pub value: V,
    pub cause: RemovalCause,
}

/// Caller-supplied removal callback
///
/// Invoked synchronously at eviction, invalidation, and replacement time;
/// implementations must return quickly or they stall the removing
/// operation.
pub type RemovalListener<K, V> = Arc<dyn Fn(RemovalEvent<K, V>) + Send + Sync>;

/// A listener that ignores every event
pub fn noop_listener<K, V>() -> RemovalListener<K, V> {
    Arc::new(|_| {})
}
