//! Per-name configuration resolution
//!
//! `resolve` looks up `<name>.expire`, `<name>.refresh`, `<name>.maxSize`,
//! and `<name>.skipCache`, falling back field-wise to the defaults in
//! [`CacheConfig::defaults`]. The first resolution for a name is memoized
//! for the resolver's lifetime, so later changes in the backing source are
//! not observed.

use crate::config::CacheConfig;
use crate::source::ConfigSource;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves cache names to immutable [`CacheConfig`] values
pub struct CacheConfigResolver {
    source: Option<Arc<dyn ConfigSource>>,
    resolved: DashMap<String, Arc<CacheConfig>>,
}

impl CacheConfigResolver {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source: Some(source),
            resolved: DashMap::new(),
        }
    }

    /// Resolver that yields the defaults for every name
    pub fn without_source() -> Self {
        Self {
            source: None,
            resolved: DashMap::new(),
        }
    }

    /// Resolve the configuration for `name`
    ///
    /// Never fails; missing or malformed fields degrade to defaults and the
    /// degradation is only observable through logs.
    pub fn resolve(&self, name: &str) -> Arc<CacheConfig> {
        if let Some(config) = self.resolved.get(name) {
            return Arc::clone(config.value());
        }
        self.resolved
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(self.resolve_uncached(name)))
            .clone()
    }

    fn resolve_uncached(&self, name: &str) -> CacheConfig {
        let mut config = CacheConfig::defaults(name);
        let Some(source) = &self.source else {
            return config;
        };

        if let Some(ttl) = self.duration_field(source.as_ref(), name, "expire") {
            config.ttl = ttl;
        }
        if let Some(refresh) = self.duration_field(source.as_ref(), name, "refresh") {
            // Zero disables refresh-ahead, matching an absent key.
            config.refresh = (!refresh.is_zero()).then_some(refresh);
        }
        if let Some(max_size) = self.size_field(source.as_ref(), name, "maxSize") {
            config.max_size = max_size;
        }
        if let Some(skip) = self.bool_field(source.as_ref(), name, "skipCache") {
            config.skip_cache_default = skip;
        }

        debug!(
            cache = %name,
            ttl_ms = config.ttl.as_millis() as u64,
            refresh_ms = config.refresh.map(|r| r.as_millis() as u64),
            max_size = config.max_size,
            skip_cache = config.skip_cache_default,
            "resolved cache configuration"
        );
        config
    }

    fn raw_field(&self, source: &dyn ConfigSource, name: &str, field: &str) -> Option<String> {
        let path = format!("{name}.{field}");
        match source.lookup(&path) {
            Ok(value) => value,
            Err(err) => {
                warn!(path = %path, error = %err, "config lookup failed, using default");
                None
            }
        }
    }

    fn duration_field(
        &self,
        source: &dyn ConfigSource,
        name: &str,
        field: &str,
    ) -> Option<Duration> {
        let raw = self.raw_field(source, name, field)?;
        match raw.trim().parse::<u64>() {
            Ok(millis) => Some(Duration::from_millis(millis)),
            Err(_) => {
                warn!(
                    cache = %name,
                    field = %field,
                    value = %raw,
                    "malformed duration, expected integer milliseconds, using default"
                );
                None
            }
        }
    }

    fn size_field(&self, source: &dyn ConfigSource, name: &str, field: &str) -> Option<usize> {
        let raw = self.raw_field(source, name, field)?;
        match raw.trim().parse::<usize>() {
            Ok(size) if size > 0 => Some(size),
            _ => {
                warn!(
                    cache = %name,
                    field = %field,
                    value = %raw,
                    "malformed size, expected positive integer, using default"
                );
                None
            }
        }
    }

    fn bool_field(&self, source: &dyn ConfigSource, name: &str, field: &str) -> Option<bool> {
        let raw = self.raw_field(source, name, field)?;
        match raw.trim().parse::<bool>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    cache = %name,
                    field = %field,
                    value = %raw,
                    "malformed boolean, using default"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for CacheConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfigResolver")
            .field("has_source", &self.source.is_some())
            .field("resolved", &self.resolved.len())
            .finish()
    }
}
