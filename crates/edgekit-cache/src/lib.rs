//! Write-buffered, time-expiring concurrent cache.
//!
//! [`TimeoutCache`] decouples put-latency from map insertion cost: writes go
//! into a lock-free buffer and are folded into the map in bounded batches by
//! whichever thread wins a non-blocking drain lock. Reads use the process
//! coarse clock, so the hot path performs no time syscall; expired entries
//! are only marked on read and physically removed by the once-per-minute
//! maintenance pass (or synchronously by [`TimeoutCache::get_exact`]).
//!
//! # Examples
//!
//! ```
//! use edgekit_cache::{CacheConfig, TimeoutCache};
//!
//! let cache: TimeoutCache<String, String> = CacheConfig::builder()
//!     .name("sessions")
//!     .ttl(std::time::Duration::from_secs(600))
//!     .max_size(100_000)
//!     .build();
//!
//! cache.put_immediate("k1".into(), "v1".into());
//! assert_eq!(cache.get(&"k1".to_string()), Some("v1".to_string()));
//! ```

mod cache;
mod config;
mod entry;
mod events;
mod stats;

pub use cache::TimeoutCache;
pub use config::{CacheConfig, CacheConfigBuilder};
pub use events::CacheEvent;
pub use stats::CacheStats;

/// Pending writes that trigger a drain attempt, and the batch size a single
/// drain folds into the map.
pub const WRITE_BUFFER_SIZE: usize = 128;

/// Maximum entries examined by one maintenance sweep.
pub const SWEEP_LIMIT: usize = 1_000;

/// Entries sampled when the cache must evict at capacity.
pub const EVICTION_SAMPLE: usize = 128;

/// Interval between maintenance passes.
pub const MAINTENANCE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
