//! Events emitted by the cache.

use edgekit_core::EdgeEvent;
use std::time::Instant;

/// Events emitted by a [`TimeoutCache`](crate::TimeoutCache).
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A read found a present entry.
    Hit {
        /// Cache instance name.
        cache_name: String,
        /// When the event occurred.
        timestamp: Instant,
    },
    /// A read found nothing.
    Miss {
        /// Cache instance name.
        cache_name: String,
        /// When the event occurred.
        timestamp: Instant,
    },
    /// An entry was evicted under capacity pressure.
    Evicted {
        /// Cache instance name.
        cache_name: String,
        /// When the event occurred.
        timestamp: Instant,
    },
    /// An expired entry was removed and its callback invoked.
    Expired {
        /// Cache instance name.
        cache_name: String,
        /// When the event occurred.
        timestamp: Instant,
    },
    /// A drain folded buffered writes into the map.
    DrainCompleted {
        /// Cache instance name.
        cache_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Writes folded by this drain.
        drained: usize,
    },
}

impl EdgeEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "cache_hit",
            CacheEvent::Miss { .. } => "cache_miss",
            CacheEvent::Evicted { .. } => "cache_evicted",
            CacheEvent::Expired { .. } => "cache_expired",
            CacheEvent::DrainCompleted { .. } => "cache_drain_completed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Evicted { timestamp, .. }
            | CacheEvent::Expired { timestamp, .. }
            | CacheEvent::DrainCompleted { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            CacheEvent::Hit { cache_name, .. }
            | CacheEvent::Miss { cache_name, .. }
            | CacheEvent::Evicted { cache_name, .. }
            | CacheEvent::Expired { cache_name, .. }
            | CacheEvent::DrainCompleted { cache_name, .. } => cache_name,
        }
    }
}
