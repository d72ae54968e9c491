//! External configuration sources
//!
//! A [`ConfigSource`] answers dotted-path lookups such as `users.expire`.
//! Sources report lookup failures instead of swallowing them; the resolver
//! absorbs every failure and degrades to defaults, so errors surface only
//! through logs.

use coffer_core::BoxError;
use serde_json::Value;
use std::collections::HashMap;

/// Read-only key/value source consulted once per cache name
pub trait ConfigSource: Send + Sync {
    /// Look up a dotted path, returning `None` when the key is absent
    fn lookup(&self, path: &str) -> Result<Option<String>, BoxError>;
}

/// Source backed by process environment variables
///
/// `users.expire` maps to `USERS_EXPIRE`, or `<PREFIX>_USERS_EXPIRE` when a
/// prefix is configured; every non-alphanumeric character becomes `_`.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: Option<String>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, path: &str) -> String {
        let mut key = String::with_capacity(path.len() + 16);
        if let Some(prefix) = &self.prefix {
            key.push_str(&prefix.to_ascii_uppercase());
            key.push('_');
        }
        for ch in path.chars() {
            if ch.is_ascii_alphanumeric() {
                key.push(ch.to_ascii_uppercase());
            } else {
                key.push('_');
            }
        }
        key
    }
}

impl ConfigSource for EnvSource {
    fn lookup(&self, path: &str) -> Result<Option<String>, BoxError> {
        match std::env::var(self.env_key(path)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(err) => Err(Box::new(err)),
        }
    }
}

/// In-memory source for embedding and tests
///
/// Nested JSON objects flatten to dotted paths, so a service can hand its
/// parsed settings tree straight to the resolver.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    values: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a single path
    pub fn set(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    /// Build a source from a JSON document, flattening nested objects
    pub fn from_json_str(json: &str) -> Result<Self, BoxError> {
        let root: Value = serde_json::from_str(json)?;
        let mut values = HashMap::new();
        flatten("", &root, &mut values);
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for StaticSource {
    fn lookup(&self, path: &str) -> Result<Option<String>, BoxError> {
        Ok(self.values.get(path).cloned())
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::Null => {}
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
