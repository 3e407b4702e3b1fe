//! Cancel handles for scheduled work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

/// Handle to a scheduled (one-shot or fixed-rate) unit of work.
///
/// Cancellation is cooperative: `cancel` suppresses fires that have not yet
/// been dispatched; a fire already handed to a worker runs to completion.
#[derive(Debug)]
pub struct ScheduledHandle {
    cancelled: Arc<AtomicBool>,
    timer: JoinHandle<()>,
}

impl ScheduledHandle {
    pub(crate) fn new(cancelled: Arc<AtomicBool>, timer: JoinHandle<()>) -> Self {
        Self { cancelled, timer }
    }

    /// Suppresses all subsequent fires and stops the timer.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.timer.abort();
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns true while the timer is still armed.
    pub fn is_active(&self) -> bool {
        !self.timer.is_finished()
    }
}
