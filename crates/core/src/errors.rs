//! Core error type definitions

use std::fmt;
use std::sync::Arc;

/// Result type alias for coffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error accepted from caller-supplied loaders and configuration
/// sources
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for coffer operations using thiserror
///
/// The type is `Clone`: a coalesced load delivers one settled `Result` to
/// every waiter attached to it, so failure causes are reference-counted
/// rather than owned by a single caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A caller-supplied loader failed
    #[error("loader for key {key} in cache {cache:?} failed: {cause}")]
    Load {
        cache: String,
        key: String,
        cause: Arc<BoxError>,
    },

    /// A named cache is already registered with different key/value types
    #[error("cache {cache:?} is registered with a different entry type")]
    TypeMismatch { cache: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Runtime construction or scheduling errors
    #[error("runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    /// Wrap a loader failure for the given cache and key
    pub fn load(cache: &str, key: &impl fmt::Debug, cause: BoxError) -> Self {
        Self::Load {
            cache: cache.to_string(),
            key: format!("{key:?}"),
            cause: Arc::new(cause),
        }
    }

    pub fn type_mismatch(cache: &str) -> Self {
        Self::TypeMismatch {
            cache: cache.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// The underlying loader failure, when this is a load error
    pub fn loader_cause(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            Self::Load { cause, .. } => Some(cause.as_ref().as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_displays_cache_key_and_cause() {
        let cause: BoxError = "connection refused".into();
        let err = Error::load("users", &"u-42", cause);
        let rendered = err.to_string();
        assert!(rendered.contains("users"));
        assert!(rendered.contains("u-42"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn load_error_clones_share_the_cause() {
        let err = Error::load("users", &1u32, "boom".into());
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert!(copy.loader_cause().is_some());
    }

    #[test]
    fn non_load_errors_have_no_loader_cause() {
        assert!(Error::configuration("bad").loader_cause().is_none());
        assert!(Error::type_mismatch("users").loader_cause().is_none());
    }
}
