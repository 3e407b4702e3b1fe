//! Timeout cache implementation.

use crate::config::{CacheConfig, ExpiryListener};
use crate::entry::CacheEntry;
use crate::events::CacheEvent;
use crate::stats::{CacheStats, Counters};
use crate::{EVICTION_SAMPLE, MAINTENANCE_INTERVAL, SWEEP_LIMIT, WRITE_BUFFER_SIZE};
use crossbeam_queue::SegQueue;
use dashmap::DashMap;
use edgekit_executor::{ExecutorError, ScheduledHandle, TaskExecutor};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

struct WriteOp<K, V> {
    key: K,
    value: V,
    expire_at: u64,
}

struct Inner<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    buffer: SegQueue<WriteOp<K, V>>,
    pending: AtomicUsize,
    drain_lock: parking_lot::Mutex<()>,
    counters: Counters,
    config: CacheConfig,
    expiry: Option<ExpiryListener<K, V>>,
}

/// High-throughput, write-buffered, time-expiring map.
///
/// All operations are total: reads and writes never fail, and a panicking
/// expiry callback is isolated per entry. Reads on the fast path consult the
/// cached coarse clock; [`get_exact`](Self::get_exact) and the maintenance
/// pass use the exact clock.
pub struct TimeoutCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for TimeoutCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> TimeoutCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(config: CacheConfig, expiry: Option<ExpiryListener<K, V>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                buffer: SegQueue::new(),
                pending: AtomicUsize::new(0),
                drain_lock: parking_lot::Mutex::new(()),
                counters: Counters::default(),
                config,
                expiry,
            }),
        }
    }

    /// Fast-path read using the coarse clock.
    ///
    /// An expired entry is marked deleted and reported absent; physical
    /// removal is left to the maintenance pass.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.inner.config.clock.now_coarse();
        if let Some(entry) = self.inner.entries.get(key) {
            if entry.is_present(now) {
                self.record_hit();
                return Some(entry.value.clone());
            }
            entry.mark_expired();
        }
        self.record_miss();
        None
    }

    /// Strict read using the exact clock.
    ///
    /// An expired entry is removed synchronously and the expiry callback is
    /// invoked (exactly once across all observers).
    pub fn get_exact(&self, key: &K) -> Option<V> {
        let now = self.inner.config.clock.now_exact();
        {
            let Some(entry) = self.inner.entries.get(key) else {
                self.record_miss();
                return None;
            };
            if entry.is_present(now) {
                self.record_hit();
                return Some(entry.value.clone());
            }
        }

        // Stale entry: removal hands it to exactly one caller.
        if let Some((key, entry)) = self
            .inner
            .entries
            .remove_if(key, |_, e| !e.is_present(now))
        {
            if entry.is_real_expiry(now) {
                self.fire_expiry(&key, &entry.value);
            }
        }
        self.record_miss();
        None
    }

    /// Buffered write; fire-and-forget.
    ///
    /// The write becomes visible after the next drain, triggered either by
    /// the buffer reaching [`WRITE_BUFFER_SIZE`] pending operations or by the
    /// maintenance pass.
    pub fn put(&self, key: K, value: V) {
        let expire_at = self.inner.config.clock.now_coarse() + self.ttl_ms();
        self.inner.buffer.push(WriteOp {
            key,
            value,
            expire_at,
        });
        let pending = self.inner.pending.fetch_add(1, Ordering::SeqCst) + 1;
        if pending >= WRITE_BUFFER_SIZE {
            self.try_drain();
        }
    }

    /// Direct write bypassing the buffer, enforcing capacity.
    pub fn put_immediate(&self, key: K, value: V) {
        let expire_at = self.inner.config.clock.now_coarse() + self.ttl_ms();
        self.insert_entry(key, value, expire_at);
    }

    /// Marks and removes an entry. Never invokes the expiry callback.
    pub fn delete(&self, key: &K) {
        if let Some(entry) = self.inner.entries.get(key) {
            entry.mark_tombstone();
        }
        self.inner.entries.remove(key);
    }

    /// Attempts a drain of up to [`WRITE_BUFFER_SIZE`] buffered writes.
    ///
    /// Single-writer discipline: if another thread already holds the drain
    /// lock, this returns immediately and the writes stay queued for the
    /// winner. Returns the number of writes folded into the map.
    pub fn try_drain(&self) -> usize {
        let Some(_guard) = self.inner.drain_lock.try_lock() else {
            return 0;
        };
        self.drain_locked(WRITE_BUFFER_SIZE)
    }

    /// Runs one maintenance pass: drain the whole buffer, then sweep.
    ///
    /// The sweep examines a bounded number of entries and removes those that
    /// are past their deadline or already marked, invoking the expiry
    /// callback once per real expiry.
    pub fn maintenance(&self) {
        {
            let _guard = self.inner.drain_lock.lock();
            while self.drain_locked(WRITE_BUFFER_SIZE) > 0 {}
        }
        self.sweep();
    }

    /// Schedules [`maintenance`](Self::maintenance) once per minute on the
    /// shared executor.
    pub fn start_maintenance(
        &self,
        executor: &TaskExecutor,
    ) -> Result<ScheduledHandle, ExecutorError> {
        let cache = self.clone();
        executor.schedule_at_fixed_rate(
            move || {
                let cache = cache.clone();
                Box::pin(async move { cache.maintenance() })
            },
            MAINTENANCE_INTERVAL,
            MAINTENANCE_INTERVAL,
        )
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.counters.hits.load(Ordering::SeqCst),
            misses: self.inner.counters.misses.load(Ordering::SeqCst),
            evictions: self.inner.counters.evictions.load(Ordering::SeqCst),
            size: self.inner.entries.len(),
            pending_writes: self.inner.pending.load(Ordering::SeqCst),
        }
    }

    /// Zeroes hit/miss/eviction counters.
    pub fn reset_statistics(&self) {
        self.inner.counters.reset();
    }

    /// Number of entries currently in the map.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns true when the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Name of this cache instance.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    fn ttl_ms(&self) -> u64 {
        self.inner.config.ttl.as_millis() as u64
    }

    fn drain_locked(&self, limit: usize) -> usize {
        let mut drained = 0;
        while drained < limit {
            match self.inner.buffer.pop() {
                Some(op) => {
                    self.inner.pending.fetch_sub(1, Ordering::SeqCst);
                    self.insert_entry(op.key, op.value, op.expire_at);
                    drained += 1;
                }
                None => break,
            }
        }
        if drained > 0 {
            self.inner.config.event_listeners.emit(&CacheEvent::DrainCompleted {
                cache_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                drained,
            });
        }
        drained
    }

    fn insert_entry(&self, key: K, value: V, expire_at: u64) {
        if self.inner.entries.len() >= self.inner.config.max_size
            && !self.inner.entries.contains_key(&key)
        {
            self.evict_one();
        }
        self.inner.entries.insert(key, CacheEntry::new(value, expire_at));

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.inner.config.name.clone())
            .set(self.inner.entries.len() as f64);
    }

    // Approximate-LRU: the earliest deadline among a bounded sample stands in
    // for least-recently-used under write-heavy load.
    fn evict_one(&self) {
        let victim = self
            .inner
            .entries
            .iter()
            .take(EVICTION_SAMPLE)
            .min_by_key(|entry| entry.value().expire_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = victim {
            if self.inner.entries.remove(&key).is_some() {
                self.inner.counters.evictions.fetch_add(1, Ordering::SeqCst);
                self.inner.config.event_listeners.emit(&CacheEvent::Evicted {
                    cache_name: self.inner.config.name.clone(),
                    timestamp: Instant::now(),
                });

                #[cfg(feature = "metrics")]
                counter!("cache_evictions_total", "cache" => self.inner.config.name.clone())
                    .increment(1);
            }
        }
    }

    fn sweep(&self) {
        let now = self.inner.config.clock.now_exact();

        // Collect first: removing while iterating would contend on the shard.
        let mut stale = Vec::new();
        for entry in self.inner.entries.iter().take(SWEEP_LIMIT) {
            if !entry.value().is_present(now) {
                stale.push(entry.key().clone());
            }
        }

        for key in stale {
            if let Some((key, entry)) = self
                .inner
                .entries
                .remove_if(&key, |_, e| !e.is_present(now))
            {
                if entry.is_real_expiry(now) {
                    self.fire_expiry(&key, &entry.value);
                }
            }
        }
    }

    fn fire_expiry(&self, key: &K, value: &V) {
        if let Some(listener) = &self.inner.expiry {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener(key, value);
            }));
            if result.is_err() {
                tracing::debug!(
                    cache = %self.inner.config.name,
                    "expiry callback panicked; sweep continues"
                );
            }
        }
        self.inner.config.event_listeners.emit(&CacheEvent::Expired {
            cache_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("cache_expirations_total", "cache" => self.inner.config.name.clone())
            .increment(1);
    }

    fn record_hit(&self) {
        self.inner.counters.hits.fetch_add(1, Ordering::SeqCst);
        self.inner.config.event_listeners.emit(&CacheEvent::Hit {
            cache_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("cache_hits_total", "cache" => self.inner.config.name.clone()).increment(1);
    }

    fn record_miss(&self) {
        self.inner.counters.misses.fetch_add(1, Ordering::SeqCst);
        self.inner.config.event_listeners.emit(&CacheEvent::Miss {
            cache_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("cache_misses_total", "cache" => self.inner.config.name.clone()).increment(1);
    }
}
