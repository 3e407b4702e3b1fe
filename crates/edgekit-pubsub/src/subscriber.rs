//! Subscriber handles.

use crate::bus::BusInner;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle to one subscription.
///
/// `unsubscribe` stops delivery; `close` additionally releases the
/// long-lived registration. A subscriber dropped without `close` stays in
/// the bus's open-subscriber diagnostic count.
pub struct Subscriber {
    id: u64,
    inner: Arc<BusInner>,
    closed: AtomicBool,
}

impl Subscriber {
    pub(crate) fn new(id: u64, inner: Arc<BusInner>) -> Self {
        Self {
            id,
            inner,
            closed: AtomicBool::new(false),
        }
    }

    /// Stops delivery to this subscriber.
    pub fn unsubscribe(&self) {
        self.inner.remove_subscription(self.id);
    }

    /// Stops delivery and releases the registration.
    ///
    /// Idempotent.
    pub fn close(&self) {
        self.unsubscribe();
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.inner.release();
        }
    }

    /// True once `close` has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
