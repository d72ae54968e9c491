//! Per-cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time-to-live applied when the source specifies none
pub const DEFAULT_TTL: Duration = Duration::from_secs(1);

/// Default bound on live entries per cache
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Resolved, immutable settings for one named cache
///
/// A config is produced at most once per name per resolver lifetime; the
/// owning cache holds it unchanged until the cache is torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache name, unique within a registry
    pub name: String,
    /// Maximum entry age, measured from the last write
    pub ttl: Duration,
    /// Entry age past which reads trigger a background reload; `None`
    /// disables refresh-ahead
    pub refresh: Option<Duration>,
    /// Bound on the number of live entries
    pub max_size: usize,
    /// Whether reads bypass the cache when the caller does not say
    /// otherwise
    pub skip_cache_default: bool,
}

impl CacheConfig {
    /// The documented defaults for `name`
    pub fn defaults(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: DEFAULT_TTL,
            refresh: None,
            max_size: DEFAULT_MAX_SIZE,
            skip_cache_default: false,
        }
    }
}
