//! Access-pattern value types

/// Per-call cache behavior flags
///
/// `skip_cache: None` defers to the cache's configured default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheFlags {
    pub skip_cache: Option<bool>,
}

impl CacheFlags {
    pub fn skip_cache(value: bool) -> Self {
        Self {
            skip_cache: Some(value),
        }
    }

    pub(crate) fn resolve_skip(self, default: bool) -> bool {
        self.skip_cache.unwrap_or(default)
    }
}

/// Outcome of an invalidation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidated<V> {
    /// A single key was invalidated; the removed value, if any
    Entry(Option<V>),
    /// The whole named cache was invalidated
    Cache(String),
}
