//! Pluggable metrics sink

use coffer_core::RemovalCause;
use std::time::Duration;

/// Sink for cache observability counters, shared by every cache in a
/// registry
///
/// Implementations must not block: these calls sit on the hot read path.
pub trait MetricsRecorder: Send + Sync {
    fn record_hit(&self, cache: &str);
    fn record_miss(&self, cache: &str);
    fn record_load_success(&self, cache: &str, latency: Duration);
    fn record_load_failure(&self, cache: &str, latency: Duration);
    fn record_eviction(&self, cache: &str, cause: RemovalCause);
}

/// Default recorder that drops every observation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn record_hit(&self, _cache: &str) {}
    fn record_miss(&self, _cache: &str) {}
    fn record_load_success(&self, _cache: &str, _latency: Duration) {}
    fn record_load_failure(&self, _cache: &str, _latency: Duration) {}
    fn record_eviction(&self, _cache: &str, _cause: RemovalCause) {}
}
