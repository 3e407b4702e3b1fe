//! Capacity pressure and eviction.

use edgekit_cache::{CacheConfig, TimeoutCache};
use edgekit_core::CoarseClock;
use std::time::Duration;

#[test]
fn size_never_exceeds_capacity() {
    let cache: TimeoutCache<String, String> = CacheConfig::builder()
        .ttl(Duration::from_secs(60))
        .max_size(100)
        .build();

    for i in 0..500 {
        cache.put_immediate(format!("k{i}"), "v".into());
    }

    assert!(cache.len() <= 100);
    assert_eq!(cache.stats().evictions, 400);
}

#[test]
fn earliest_deadline_is_the_victim() {
    let clock = CoarseClock::new();
    let cache: TimeoutCache<String, String> = CacheConfig::builder()
        .ttl(Duration::from_secs(60))
        .max_size(3)
        .clock(clock.clone())
        .build();

    for key in ["old", "mid", "new"] {
        cache.put_immediate(key.to_string(), "v".into());
        std::thread::sleep(Duration::from_millis(5));
        clock.refresh();
    }
    cache.put_immediate("extra".to_string(), "v".into());

    assert_eq!(cache.get(&"old".to_string()), None);
    assert_eq!(cache.get(&"new".to_string()), Some("v".to_string()));
    assert_eq!(cache.get(&"extra".to_string()), Some("v".to_string()));
}

#[test]
fn drained_writes_respect_capacity_too() {
    let cache: TimeoutCache<String, String> = CacheConfig::builder()
        .ttl(Duration::from_secs(60))
        .max_size(10)
        .build();

    for i in 0..50 {
        cache.put(format!("k{i}"), "v".into());
    }
    cache.maintenance();

    assert!(cache.len() <= 10);
}
