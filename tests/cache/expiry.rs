//! Expiry semantics: lazy marks, strict reads, exactly-once callbacks.

use edgekit_cache::{CacheConfig, TimeoutCache};
use edgekit_core::CoarseClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn expiring_cache(
    ttl: Duration,
) -> (TimeoutCache<String, String>, CoarseClock, Arc<AtomicUsize>) {
    let clock = CoarseClock::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let cache = CacheConfig::builder()
        .name("expiry")
        .ttl(ttl)
        .clock(clock.clone())
        .on_expiry(move |_key: &String, _value: &String| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    (cache, clock, fired)
}

#[test]
fn get_marks_but_does_not_remove() {
    let (cache, clock, fired) = expiring_cache(Duration::from_millis(5));
    cache.put_immediate("k".into(), "v".into());

    std::thread::sleep(Duration::from_millis(20));
    clock.refresh();

    assert_eq!(cache.get(&"k".to_string()), None);
    assert_eq!(cache.len(), 1, "lazy expiry leaves removal to maintenance");
    assert_eq!(fired.load(Ordering::SeqCst), 0, "get never fires the callback");
}

#[test]
fn get_exact_removes_and_fires_exactly_once() {
    let (cache, clock, fired) = expiring_cache(Duration::from_millis(5));
    cache.put_immediate("k".into(), "v".into());

    std::thread::sleep(Duration::from_millis(20));
    clock.refresh();

    assert_eq!(cache.get_exact(&"k".to_string()), None);
    assert_eq!(cache.len(), 0);

    // Further observers see nothing and re-fire nothing.
    assert_eq!(cache.get_exact(&"k".to_string()), None);
    cache.maintenance();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn maintenance_fires_once_for_lazily_marked_entries() {
    let (cache, clock, fired) = expiring_cache(Duration::from_millis(5));
    cache.put_immediate("k".into(), "v".into());

    std::thread::sleep(Duration::from_millis(20));
    clock.refresh();

    // Lazy mark first, then the sweep performs the real removal.
    assert_eq!(cache.get(&"k".to_string()), None);
    cache.maintenance();
    cache.maintenance();

    assert_eq!(cache.len(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_strict_readers_fire_exactly_once() {
    let (cache, clock, fired) = expiring_cache(Duration::from_millis(5));
    for i in 0..32 {
        cache.put_immediate(format!("k{i}"), "v".into());
    }

    std::thread::sleep(Duration::from_millis(20));
    clock.refresh();

    let cache = Arc::new(cache);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(std::thread::spawn(move || {
            for i in 0..32 {
                let _ = cache.get_exact(&format!("k{i}"));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(fired.load(Ordering::SeqCst), 32);
}

#[test]
fn delete_is_not_an_expiry() {
    let (cache, _clock, fired) = expiring_cache(Duration::from_secs(60));
    cache.put_immediate("k".into(), "v".into());
    cache.delete(&"k".to_string());
    cache.maintenance();

    assert_eq!(cache.len(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
