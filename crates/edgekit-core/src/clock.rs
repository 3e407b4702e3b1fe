//! Cached coarse clock source.
//!
//! High-QPS expiration checks should not pay a time syscall per read. The
//! coarse clock caches the current unix-epoch millisecond timestamp in a
//! single atomic, refreshed every 100 ms by a background task. Security
//! sensitive paths read the exact clock instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

/// Interval at which the cached timestamp is refreshed.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// A millisecond clock with a cached coarse reading and an exact reading.
///
/// `now_coarse` may trail the real time by up to [`REFRESH_INTERVAL`];
/// `now_exact` always performs the syscall.
///
/// # Examples
///
/// ```
/// use edgekit_core::CoarseClock;
///
/// let clock = CoarseClock::new();
/// assert!(clock.now_coarse() > 0);
/// assert!(clock.now_exact() >= clock.now_coarse());
/// ```
#[derive(Clone)]
pub struct CoarseClock {
    cached_ms: Arc<AtomicU64>,
}

impl CoarseClock {
    /// Creates a new clock, seeded with the current time.
    ///
    /// The cached value only advances via [`refresh`](Self::refresh) or the
    /// background refresher started with [`start`](Self::start).
    pub fn new() -> Self {
        Self {
            cached_ms: Arc::new(AtomicU64::new(unix_millis())),
        }
    }

    /// Returns the cached millisecond timestamp.
    pub fn now_coarse(&self) -> u64 {
        self.cached_ms.load(Ordering::Relaxed)
    }

    /// Returns the real current millisecond timestamp (syscall).
    pub fn now_exact(&self) -> u64 {
        unix_millis()
    }

    /// Re-reads the system time into the cache.
    pub fn refresh(&self) {
        self.cached_ms.store(unix_millis(), Ordering::Relaxed);
    }

    /// Spawns the background refresher on the current tokio runtime.
    ///
    /// The returned handle can be aborted to stop refreshing; the clock then
    /// freezes at its last cached value until `refresh` is called again.
    pub fn start(&self) -> JoinHandle<()> {
        let cached = Arc::clone(&self.cached_ms);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                cached.store(unix_millis(), Ordering::Relaxed);
            }
        })
    }
}

impl Default for CoarseClock {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
