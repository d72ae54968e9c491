//! Cache configuration for coffer
//!
//! This crate resolves cache names to immutable [`CacheConfig`] values by
//! consulting an external [`ConfigSource`]. Resolution never fails: missing,
//! malformed, or unreachable configuration degrades field-wise to documented
//! defaults.

pub mod config;
pub mod resolver;
pub mod source;

pub use config::{CacheConfig, DEFAULT_MAX_SIZE, DEFAULT_TTL};
pub use resolver::CacheConfigResolver;
pub use source::{ConfigSource, EnvSource, StaticSource};
