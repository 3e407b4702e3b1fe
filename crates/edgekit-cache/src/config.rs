//! Configuration for the timeout cache.

use crate::events::CacheEvent;
use edgekit_core::{CoarseClock, EventListeners};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked when an entry is removed because it expired.
pub(crate) type ExpiryListener<K, V> = Arc<dyn Fn(&K, &V) + Send + Sync>;

/// Configuration for a [`TimeoutCache`](crate::TimeoutCache).
#[derive(Clone)]
pub struct CacheConfig {
    /// Entry time-to-live.
    pub(crate) ttl: Duration,
    /// Maximum number of entries held in the map.
    pub(crate) max_size: usize,
    /// Name of this cache instance.
    pub(crate) name: String,
    /// Clock used for coarse reads.
    pub(crate) clock: CoarseClock,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<CacheEvent>,
}

impl CacheConfig {
    /// Creates a new configuration builder.
    pub fn builder<K, V>() -> CacheConfigBuilder<K, V> {
        CacheConfigBuilder::new()
    }
}

/// Builder for cache configuration.
pub struct CacheConfigBuilder<K, V> {
    ttl: Duration,
    max_size: usize,
    name: String,
    clock: Option<CoarseClock>,
    event_listeners: EventListeners<CacheEvent>,
    expiry_listener: Option<ExpiryListener<K, V>>,
}

impl<K, V> CacheConfigBuilder<K, V> {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_size: 10_000_000,
            name: "cache".to_string(),
            clock: None,
            event_listeners: EventListeners::new(),
            expiry_listener: None,
        }
    }

    /// Sets the entry time-to-live.
    ///
    /// Default: 10 minutes
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of entries.
    ///
    /// At capacity, inserting a new key evicts the sampled entry with the
    /// earliest deadline.
    /// Default: 10,000,000
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Sets the name of this cache instance.
    ///
    /// Default: "cache"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Shares a process-wide coarse clock with this cache.
    ///
    /// Without one, the cache owns a clock that only advances when its
    /// background refresher is started or `refresh` is driven manually.
    pub fn clock(mut self, clock: CoarseClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Registers the callback invoked when an entry is removed because it
    /// expired. Invoked exactly once per expired entry; a panicking callback
    /// is isolated and never interrupts a sweep.
    pub fn on_expiry<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        self.expiry_listener = Some(Arc::new(f));
        self
    }

    /// Registers a callback for cache hits.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CacheEvent::Hit { .. } = event {
                f();
            }
        });
        self
    }

    /// Registers a callback for cache misses.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CacheEvent::Miss { .. } = event {
                f();
            }
        });
        self
    }

    /// Registers a callback for capacity evictions.
    pub fn on_eviction<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CacheEvent::Evicted { .. } = event {
                f();
            }
        });
        self
    }

    /// Registers a callback for completed drains, with the batch size.
    pub fn on_drain<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let CacheEvent::DrainCompleted { drained, .. } = event {
                f(*drained);
            }
        });
        self
    }

    /// Builds the cache.
    pub fn build(self) -> crate::TimeoutCache<K, V>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let config = CacheConfig {
            ttl: self.ttl,
            max_size: self.max_size,
            name: self.name,
            clock: self.clock.unwrap_or_default(),
            event_listeners: self.event_listeners,
        };
        crate::TimeoutCache::new(config, self.expiry_listener)
    }
}

impl<K, V> Default for CacheConfigBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
