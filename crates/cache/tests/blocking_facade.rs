//! The blocking facade drives the same policy from synchronous callers

use coffer_cache::{
    noop_listener, BlockingCacheOps, CacheFlags, CacheRegistry, Error, Invalidated, LoadResult,
    StaticSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn blocking_ops_with(source: StaticSource) -> BlockingCacheOps {
    let registry = CacheRegistry::builder()
        .with_config_source(Arc::new(source))
        .build();
    BlockingCacheOps::new(Arc::new(registry)).unwrap()
}

fn counting_loader(
    calls: &Arc<AtomicUsize>,
) -> impl FnOnce(String) -> LoadResult<usize> + Send + 'static {
    let calls = Arc::clone(calls);
    move |_key| Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
}

#[test]
fn synchronous_loaders_populate_the_cache() {
    let ops = blocking_ops_with(StaticSource::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let first = ops
        .get_or_compute(
            "users",
            "k".to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();
    let second = ops
        .get_or_compute(
            "users",
            "k".to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn loader_errors_surface_to_the_blocking_caller() {
    let ops = blocking_ops_with(StaticSource::new());

    let err = ops
        .get_or_compute(
            "users",
            "k".to_string(),
            |_key| Err::<usize, _>("backend down".into()),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Load { .. }));
}

#[test]
fn skip_cache_writes_through_for_later_reads() {
    let ops = blocking_ops_with(StaticSource::new());
    let calls = Arc::new(AtomicUsize::new(0));

    for expected in 1..=2 {
        let value = ops
            .get_or_compute(
                "users",
                "k".to_string(),
                counting_loader(&calls),
                noop_listener(),
                CacheFlags::skip_cache(true),
            )
            .unwrap();
        assert_eq!(value, expected);
    }

    let cached = ops
        .get_or_compute(
            "users",
            "k".to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();
    assert_eq!(cached, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn fallback_returns_the_last_good_value() {
    let ops = blocking_ops_with(StaticSource::new());

    let fresh = ops
        .compute_with_fallback(
            "fb",
            "k".to_string(),
            |_key| Ok(21usize),
            noop_listener(),
        )
        .unwrap();
    assert_eq!(fresh, 21);

    let stale = ops
        .compute_with_fallback(
            "fb",
            "k".to_string(),
            |_key| Err::<usize, _>("db down".into()),
            noop_listener(),
        )
        .unwrap();
    assert_eq!(stale, 21);
}

#[test]
fn refresh_ahead_progresses_between_blocking_calls() {
    let ops = blocking_ops_with(
        StaticSource::new()
            .set("ra.expire", "5000")
            .set("ra.refresh", "100"),
    );
    let calls = Arc::new(AtomicUsize::new(0));

    let first = ops
        .get_or_compute(
            "ra",
            "k".to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();
    assert_eq!(first, 1);

    thread::sleep(Duration::from_millis(150));
    let stale = ops
        .get_or_compute(
            "ra",
            "k".to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();
    assert_eq!(stale, 1);

    // The facade's own runtime finishes the refresh with no caller active.
    thread::sleep(Duration::from_millis(100));
    let fresh = ops
        .get_or_compute(
            "ra",
            "k".to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();
    assert_eq!(fresh, 2);
}

#[test]
fn invalidate_and_clear_mirror_the_async_facade() {
    let ops = blocking_ops_with(StaticSource::new());
    let calls = Arc::new(AtomicUsize::new(0));

    for key in ["k1", "k2"] {
        ops.get_or_compute(
            "inv",
            key.to_string(),
            counting_loader(&calls),
            noop_listener(),
            CacheFlags::default(),
        )
        .unwrap();
    }

    let removed = ops
        .invalidate::<String, usize>("inv", Some(&"k1".to_string()))
        .unwrap();
    assert_eq!(removed, Invalidated::Entry(Some(1)));

    let outcome = ops.invalidate::<String, usize>("inv", None).unwrap();
    assert_eq!(outcome, Invalidated::Cache("inv".to_string()));

    assert!(ops.clear("inv"));
    assert!(!ops.clear("inv"));
}

#[tokio::test]
async fn construction_is_rejected_from_async_context() {
    let registry = Arc::new(CacheRegistry::builder().build());
    let err = BlockingCacheOps::new(registry).unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
}
