//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic cache counters, zeroed by `reset`.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) evictions: AtomicU64,
}

impl Counters {
    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
        self.evictions.store(0, Ordering::SeqCst);
    }
}

/// Point-in-time cache statistics snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Reads that found a present entry.
    pub hits: u64,
    /// Reads that found nothing (absent, expired, or tombstoned).
    pub misses: u64,
    /// Entries evicted under capacity pressure.
    pub evictions: u64,
    /// Entries currently in the map (including lazily expired ones awaiting
    /// the next sweep).
    pub size: usize,
    /// Writes queued in the buffer, not yet folded into the map.
    pub pending_writes: usize,
}

impl CacheStats {
    /// Hit ratio over all reads since the last reset; 0.0 when no reads.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
