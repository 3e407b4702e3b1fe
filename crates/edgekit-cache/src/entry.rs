//! Cache entry state.

use std::sync::atomic::{AtomicU8, Ordering};

// One-way state machine: LIVE -> EXPIRED -> TOMBSTONE (monotonic via fetch_max).
const LIVE: u8 = 0;
const EXPIRED: u8 = 1;
const TOMBSTONE: u8 = 2;

#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) expire_at: u64,
    state: AtomicU8,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, expire_at: u64) -> Self {
        Self {
            value,
            expire_at,
            state: AtomicU8::new(LIVE),
        }
    }

    /// Present means live and not past its deadline.
    pub(crate) fn is_present(&self, now_ms: u64) -> bool {
        self.state.load(Ordering::Acquire) == LIVE && now_ms <= self.expire_at
    }

    /// Marks the entry as lazily expired. The flag only ever advances.
    pub(crate) fn mark_expired(&self) {
        self.state.fetch_max(EXPIRED, Ordering::AcqRel);
    }

    /// Marks the entry as explicitly deleted, which suppresses the expiry
    /// callback at removal time.
    pub(crate) fn mark_tombstone(&self) {
        self.state.fetch_max(TOMBSTONE, Ordering::AcqRel);
    }

    /// True when removal of this entry counts as a real expiry.
    pub(crate) fn is_real_expiry(&self, now_ms: u64) -> bool {
        let state = self.state.load(Ordering::Acquire);
        state != TOMBSTONE && (state == EXPIRED || now_ms > self.expire_at)
    }
}
