//! Buffered-write visibility.

use edgekit_cache::{CacheConfig, TimeoutCache, WRITE_BUFFER_SIZE};
use edgekit_core::CoarseClock;
use std::sync::Arc;
use std::time::Duration;

fn cache() -> TimeoutCache<String, String> {
    CacheConfig::builder()
        .name("visibility")
        .ttl(Duration::from_secs(60))
        .build()
}

#[test]
fn buffered_put_becomes_visible_within_one_drain() {
    let cache = cache();
    cache.put("k1".into(), "v1".into());

    // Before any drain the read may miss; that is allowed.
    let _ = cache.get(&"k1".to_string());

    // After at most one drain cycle the write must be visible.
    cache.try_drain();
    assert_eq!(cache.get(&"k1".to_string()), Some("v1".to_string()));
}

#[test]
fn reaching_the_buffer_threshold_drains_synchronously() {
    let cache = cache();
    for i in 0..WRITE_BUFFER_SIZE {
        cache.put(format!("k{i}"), "v".into());
    }
    assert_eq!(cache.stats().pending_writes, 0);
    assert_eq!(cache.len(), WRITE_BUFFER_SIZE);
}

#[test]
fn last_write_wins_for_a_single_key() {
    let cache = cache();
    for round in 0..5 {
        cache.put("k".into(), format!("v{round}"));
    }
    cache.maintenance();
    assert_eq!(cache.get(&"k".to_string()), Some("v4".to_string()));
}

#[test]
fn concurrent_writers_never_lose_operations() {
    let cache = Arc::new(cache());
    let mut handles = Vec::new();
    for writer in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(std::thread::spawn(move || {
            for i in 0..500 {
                cache.put(format!("w{writer}-{i}"), "v".into());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    cache.maintenance();
    assert_eq!(cache.len(), 2_000);
    assert_eq!(cache.stats().pending_writes, 0);
}

#[test]
fn stats_track_reads_and_pending_writes() {
    let clock = CoarseClock::new();
    let cache: TimeoutCache<String, String> = CacheConfig::builder()
        .ttl(Duration::from_secs(60))
        .clock(clock)
        .build();

    cache.put_immediate("a".into(), "1".into());
    assert_eq!(cache.get(&"a".to_string()), Some("1".to_string()));
    assert_eq!(cache.get(&"missing".to_string()), None);
    cache.put("b".into(), "2".into());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.pending_writes, 1);
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);

    cache.reset_statistics();
    assert_eq!(cache.stats().hits, 0);
}
