//! Internal system snapshot for the `/_health` and `/_status` endpoints.

use parking_lot::Mutex;
use std::sync::Arc;
use sysinfo::System;

/// Executor counters surfaced in the internal snapshot.
///
/// The executor itself is not a dependency of this crate; the embedding
/// runtime adapts its own stats into this narrow shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCounters {
    /// Pool worker threads.
    pub workers: usize,
    /// Jobs waiting in the queue.
    pub queued: usize,
    /// Jobs currently running.
    pub in_flight: usize,
    /// Jobs completed since start.
    pub completed: u64,
}

/// Source of executor counters, polled per snapshot request.
pub type TaskCounterSource = Arc<dyn Fn() -> TaskCounters + Send + Sync>;

pub(crate) struct SystemSnapshot {
    system: Mutex<System>,
}

impl SystemSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// Refreshes and reads memory totals in bytes: (total, available).
    pub(crate) fn memory(&self) -> (u64, u64) {
        let mut system = self.system.lock();
        system.refresh_memory();
        (system.total_memory(), system.available_memory())
    }

    pub(crate) fn processors(&self) -> usize {
        num_cpus::get()
    }
}
