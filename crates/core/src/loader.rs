//! Loader type aliases shared by the blocking and non-blocking facades

use crate::errors::BoxError;
use futures::future::BoxFuture;

/// Outcome of a caller-supplied loader
pub type LoadResult<V> = std::result::Result<V, BoxError>;

/// Deferred value produced by an asynchronous loader
///
/// Async loaders are `FnOnce(K) -> LoadFuture<V>`; the blocking facade
/// bridges synchronous `FnOnce(K) -> LoadResult<V>` loaders into this form.
pub type LoadFuture<V> = BoxFuture<'static, LoadResult<V>>;
