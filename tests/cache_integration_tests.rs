//! Integration Tests for the Cache
//!
//! Exercises the public API end to end. Most tests run on a paused tokio
//! clock, so expiration and sweeping are driven by simulated time.

use std::sync::Arc;
use std::time::Duration;

use expiring_cache::{
    new_number_key_cache, new_string_key_cache, with_expire_after_access, with_max_size, Cache,
    CacheConfig, CacheOption, MeasureUnit, NumberKeyCache, StringKeyCache,
};
use tokio::time;

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn create_test_cache(options: Vec<CacheOption>) -> StringKeyCache<String> {
    init_tracing();
    new_string_key_cache(
        Duration::from_secs(1),
        Duration::from_secs(300),
        MeasureUnit::Seconds,
        options,
    )
}

fn key(s: &str) -> String {
    s.to_string()
}

fn value(s: &str) -> String {
    s.to_string()
}

// == Lookup Tests ==

#[tokio::test(start_paused = true)]
async fn test_get_absent_key_returns_empty_value() {
    let cache = create_test_cache(vec![]);

    assert_eq!(cache.get(&key("missing")), None);
    assert_eq!(cache.fetch(&key("missing")), (String::new(), false));
}

#[tokio::test(start_paused = true)]
async fn test_put_ttl_then_get_until_expiry() {
    let cache = create_test_cache(vec![]);

    cache.put_ttl(key("k"), value("v"), Duration::from_secs(2));
    assert_eq!(cache.fetch(&key("k")), (value("v"), true));

    time::advance(Duration::from_millis(1_999)).await;
    assert_eq!(cache.get(&key("k")), Some(value("v")));

    time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.fetch(&key("k")), (String::new(), false));
}

#[tokio::test(start_paused = true)]
async fn test_put_uses_default_ttl() {
    init_tracing();
    let cache: NumberKeyCache<u32> = new_number_key_cache(
        Duration::from_secs(60),
        Duration::from_secs(5),
        MeasureUnit::Seconds,
        [],
    );

    cache.put(1, 10);
    time::advance(Duration::from_secs(4)).await;
    assert_eq!(cache.get(&1), Some(10));

    time::advance(Duration::from_secs(1)).await;
    assert_eq!(cache.get(&1), None);
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_is_not_found() {
    let cache = create_test_cache(vec![]);

    cache.put_ttl(key("k"), value("v"), Duration::ZERO);

    assert_eq!(cache.fetch(&key("k")), (String::new(), false));
}

// == Size Bound Tests ==

#[tokio::test(start_paused = true)]
async fn test_max_size_evicts_least_recently_accessed() {
    let cache = create_test_cache(vec![with_max_size(2)]);

    cache.put(key("k1"), value("v1"));
    cache.put(key("k2"), value("v2"));
    assert!(cache.get(&key("k1")).is_some());
    assert!(cache.get(&key("k2")).is_some());

    cache.put(key("k3"), value("v3"));

    assert_eq!(cache.stats().evictions, 1);
    assert_eq!(cache.get(&key("k1")), None);
    assert_eq!(cache.get(&key("k2")), Some(value("v2")));
    assert_eq!(cache.get(&key("k3")), Some(value("v3")));
}

#[tokio::test(start_paused = true)]
async fn test_read_protects_entry_from_eviction() {
    let cache = create_test_cache(vec![with_max_size(2)]);

    cache.put(key("k1"), value("v1"));
    cache.put(key("k2"), value("v2"));
    assert!(cache.get(&key("k1")).is_some());

    cache.put(key("k3"), value("v3"));

    assert!(cache.contains(&key("k1")));
    assert!(!cache.contains(&key("k2")));
    assert!(cache.contains(&key("k3")));
}

#[tokio::test(start_paused = true)]
async fn test_reinsert_does_not_count_as_new_entry() {
    let cache = create_test_cache(vec![with_max_size(2)]);

    cache.put(key("k1"), value("v1"));
    cache.put(key("k2"), value("v2"));
    cache.put(key("k2"), value("v2b"));

    assert_eq!(cache.count(), 2);
    assert_eq!(cache.stats().evictions, 0);
    assert_eq!(cache.get(&key("k2")), Some(value("v2b")));
}

#[tokio::test(start_paused = true)]
async fn test_zero_max_size_retains_nothing() {
    let cache = create_test_cache(vec![with_max_size(0)]);

    cache.put(key("k1"), value("v1"));

    assert_eq!(cache.count(), 0);
    assert_eq!(cache.get(&key("k1")), None);
}

#[tokio::test(start_paused = true)]
async fn test_full_cache_reuses_expired_slot_before_evicting() {
    init_tracing();
    // Sweeps are far apart so only the insert can reclaim the dead entry
    let cache: StringKeyCache<String> = new_string_key_cache(
        Duration::from_secs(3600),
        Duration::from_secs(300),
        MeasureUnit::Seconds,
        [with_max_size(2)],
    );

    cache.put(key("live"), value("l"));
    cache.put_ttl(key("dead"), value("d"), Duration::from_secs(1));
    time::advance(Duration::from_secs(2)).await;

    cache.put(key("new"), value("n"));

    assert_eq!(cache.get(&key("live")), Some(value("l")));
    assert_eq!(cache.get(&key("new")), Some(value("n")));
    assert_eq!(cache.count(), 2);
    assert_eq!(cache.stats().evictions, 0);
    assert_eq!(cache.stats().sweeps, 0);
}

#[tokio::test(start_paused = true)]
async fn test_options_last_write_wins() {
    let cache = create_test_cache(vec![with_max_size(1), with_max_size(3)]);

    for k in ["a", "b", "c"] {
        cache.put(key(k), value(k));
    }

    assert_eq!(cache.count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_expire_after_access_is_reported() {
    let refreshing = create_test_cache(vec![with_expire_after_access(Duration::from_secs(5))]);
    let plain = create_test_cache(vec![]);

    assert_eq!(refreshing.expire_after_access(), Some(Duration::from_secs(5)));
    assert_eq!(plain.expire_after_access(), None);
}

#[tokio::test(start_paused = true)]
async fn test_huge_sweep_frequency_does_not_break_cache() {
    init_tracing();
    let cache: StringKeyCache<String> = new_string_key_cache(
        Duration::MAX,
        Duration::from_secs(1),
        MeasureUnit::Seconds,
        [],
    );
    tokio::task::yield_now().await;

    cache.put(key("k"), value("v"));
    assert_eq!(cache.get(&key("k")), Some(value("v")));

    time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cache.get(&key("k")), None);
    assert_eq!(cache.stats().sweeps, 0);
    cache.close();
}

// == Access-Refresh Expiration Tests ==

#[tokio::test(start_paused = true)]
async fn test_expire_after_access_slides_window() {
    init_tracing();
    let cache: StringKeyCache<String> = new_string_key_cache(
        Duration::from_secs(60),
        Duration::from_secs(1),
        MeasureUnit::Seconds,
        [with_expire_after_access(Duration::from_secs(1))],
    );

    cache.put(key("k"), value("v"));
    for _ in 0..5 {
        time::advance(Duration::from_millis(800)).await;
        assert_eq!(cache.get(&key("k")), Some(value("v")));
    }

    time::advance(Duration::from_secs(1)).await;
    assert_eq!(cache.get(&key("k")), None);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_mode_does_not_slide_on_read() {
    let cache = create_test_cache(vec![]);

    cache.put_ttl(key("k"), value("v"), Duration::from_secs(1));
    time::advance(Duration::from_millis(800)).await;
    assert!(cache.get(&key("k")).is_some());

    time::advance(Duration::from_millis(200)).await;
    assert_eq!(cache.get(&key("k")), None);
}

// == Invalidation Tests ==

#[tokio::test(start_paused = true)]
async fn test_invalidate_present_key() {
    let cache = create_test_cache(vec![]);
    cache.put(key("k"), value("v"));

    cache.invalidate(&key("k"));

    assert_eq!(cache.get(&key("k")), None);
    assert_eq!(cache.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_absent_key_is_noop() {
    let cache = create_test_cache(vec![]);
    cache.put(key("k"), value("v"));

    cache.invalidate(&key("other"));

    assert_eq!(cache.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_all() {
    let cache = create_test_cache(vec![]);
    for k in ["a", "b", "c"] {
        cache.put(key(k), value(k));
    }

    cache.invalidate_all();

    assert_eq!(cache.count(), 0);
    assert!(cache.all().is_empty());
}

// == Enumeration Tests ==

#[tokio::test(start_paused = true)]
async fn test_all_returns_what_was_put() {
    let cache = create_test_cache(vec![]);
    let pairs = [("a", "1"), ("b", "2"), ("c", "3")];
    for (k, v) in pairs {
        cache.put(key(k), value(v));
    }

    let mut entries: Vec<(String, String)> =
        cache.all().into_iter().map(|e| e.into_parts()).collect();
    entries.sort();

    let expected: Vec<(String, String)> = pairs.iter().map(|(k, v)| (key(k), value(v))).collect();
    assert_eq!(entries, expected);
}

#[tokio::test(start_paused = true)]
async fn test_all_is_a_snapshot() {
    let cache = create_test_cache(vec![]);
    cache.put(key("a"), value("1"));

    let snapshot = cache.all();
    cache.put(key("b"), value("2"));
    cache.invalidate(&key("a"));

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].key(), "a");
    assert_eq!(snapshot[0].data(), "1");
}

#[tokio::test(start_paused = true)]
async fn test_count_and_all_skip_unswept_expired_entries() {
    let cache: StringKeyCache<String> = new_string_key_cache(
        Duration::from_secs(3600),
        Duration::from_secs(300),
        MeasureUnit::Seconds,
        [],
    );
    cache.put_ttl(key("short"), value("x"), Duration::from_secs(1));
    cache.put(key("long"), value("y"));

    time::advance(Duration::from_secs(2)).await;

    assert_eq!(cache.count(), 1);
    assert_eq!(cache.all().len(), 1);
    assert_eq!(cache.stats().total_entries, 2);
}

// == Sweeper Tests ==

#[tokio::test(start_paused = true)]
async fn test_sweeper_purges_without_reads() {
    let cache = create_test_cache(vec![]);
    cache.put_ttl(key("short"), value("x"), Duration::from_millis(500));
    cache.put(key("long"), value("y"));

    time::sleep(Duration::from_millis(1_500)).await;

    let stats = cache.stats();
    assert_eq!(stats.sweeps, 1);
    assert_eq!(stats.expirations, 1);
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.hits + stats.misses, 0);
}

#[tokio::test(start_paused = true)]
async fn test_purify_runs_immediately() {
    let cache: StringKeyCache<String> = new_string_key_cache(
        Duration::from_secs(3600),
        Duration::from_secs(300),
        MeasureUnit::Seconds,
        [],
    );
    cache.put_ttl(key("a"), value("x"), Duration::from_secs(1));
    cache.put_ttl(key("b"), value("y"), Duration::from_secs(1));
    time::advance(Duration::from_secs(1)).await;

    assert_eq!(cache.purify(), 2);
    assert_eq!(cache.stats().total_entries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_sweeps_after_close() {
    let cache = create_test_cache(vec![]);
    cache.put_ttl(key("a"), value("x"), Duration::from_secs(10));

    time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(cache.stats().sweeps, 2);

    cache.close();
    let at_close = cache.stats();

    time::sleep(Duration::from_secs(10)).await;

    assert_eq!(cache.stats(), at_close);
    assert_eq!(at_close.sweeps, 2);
}

// == Lifecycle Tests ==

#[tokio::test(start_paused = true)]
async fn test_closed_cache_ignores_writes_and_reads_empty() {
    let cache = create_test_cache(vec![]);
    cache.put(key("a"), value("1"));

    cache.close();
    cache.put(key("b"), value("2"));

    assert!(cache.is_closed());
    assert_eq!(cache.fetch(&key("a")), (String::new(), false));
    assert_eq!(cache.get(&key("b")), None);
    assert_eq!(cache.count(), 0);
    assert!(cache.all().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_close_is_idempotent() {
    let cache = create_test_cache(vec![]);

    cache.close();
    cache.close();

    assert!(cache.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_cache_from_config() {
    init_tracing();
    let config = CacheConfig::new(
        Duration::from_millis(100),
        Duration::from_millis(250),
        MeasureUnit::Millis,
    )
    .apply([CacheOption::MaxSize(8)]);
    let cache: Cache<i64, u8> = expiring_cache::CacheBuilder::new(config).build().unwrap();

    cache.put_ttl_amount(1, 1, 150);
    time::sleep(Duration::from_millis(250)).await;

    assert_eq!(cache.stats().expirations, 1);
    assert_eq!(cache.time_to_live_amount(), 250);
}

// == Concurrency Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_put_get_on_distinct_keys() {
    init_tracing();
    let cache: Arc<NumberKeyCache<u64>> = Arc::new(new_number_key_cache(
        Duration::from_millis(10),
        Duration::from_secs(300),
        MeasureUnit::Millis,
        [],
    ));
    let threads = 8;
    let per_thread = 500;

    std::thread::scope(|scope| {
        for t in 0..threads {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..per_thread {
                    let k = (t * per_thread + i) as i64;
                    cache.put(k, k as u64 * 2);
                    assert_eq!(cache.get(&k), Some(k as u64 * 2));
                }
            });
        }
    });

    assert_eq!(cache.count(), threads * per_thread);
    for k in 0..(threads * per_thread) as i64 {
        assert_eq!(cache.get(&k), Some(k as u64 * 2), "Lost update for key {}", k);
    }
    cache.close();
}
