//! Events emitted by the scheduler.

use edgekit_core::EdgeEvent;
use std::time::Instant;

/// Events emitted by a [`TaskScheduler`](crate::TaskScheduler).
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// A task was placed on the timer.
    TaskScheduled {
        /// Scheduler instance name.
        scheduler_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Task name.
        task: String,
    },
    /// A fire was handed to the executor.
    TaskFired {
        /// Scheduler instance name.
        scheduler_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Task name.
        task: String,
    },
    /// A fire was skipped outside its window or day set.
    TaskSkipped {
        /// Scheduler instance name.
        scheduler_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Task name.
        task: String,
    },
    /// A task body returned an error or panicked.
    TaskFailed {
        /// Scheduler instance name.
        scheduler_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Task name.
        task: String,
    },
}

impl EdgeEvent for SchedulerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SchedulerEvent::TaskScheduled { .. } => "task_scheduled",
            SchedulerEvent::TaskFired { .. } => "task_fired",
            SchedulerEvent::TaskSkipped { .. } => "task_skipped",
            SchedulerEvent::TaskFailed { .. } => "task_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SchedulerEvent::TaskScheduled { timestamp, .. }
            | SchedulerEvent::TaskFired { timestamp, .. }
            | SchedulerEvent::TaskSkipped { timestamp, .. }
            | SchedulerEvent::TaskFailed { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            SchedulerEvent::TaskScheduled { scheduler_name, .. }
            | SchedulerEvent::TaskFired { scheduler_name, .. }
            | SchedulerEvent::TaskSkipped { scheduler_name, .. }
            | SchedulerEvent::TaskFailed { scheduler_name, .. } => scheduler_name,
        }
    }
}
