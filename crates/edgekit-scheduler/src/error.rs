//! Error types for the scheduler.

use edgekit_executor::ExecutorError;

/// Errors raised while parsing descriptors or starting the scheduler.
///
/// Every variant except `Executor` is a boot-time configuration error and
/// is fatal to startup.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Period string was not `N(w|d|h|m)` or `M`.
    #[error("unparseable period {0:?} (expected Nw, Nd, Nh, Nm, or M)")]
    InvalidPeriod(String),
    /// Time string was not `HH:MM`.
    #[error("unparseable time of day {0:?} (expected HH:MM)")]
    InvalidTime(String),
    /// Date string was not `YYYYMMDD`.
    #[error("unparseable date {0:?} (expected YYYYMMDD)")]
    InvalidDate(String),
    /// Day-of-week token was not recognized.
    #[error("unknown day of week {0:?}")]
    InvalidDayOfWeek(String),
    /// Timezone string was not a known IANA zone.
    #[error("unknown timezone {0:?}")]
    InvalidTimezone(String),
    /// Monthly tasks anchor on their start date's day of month.
    #[error("task {0:?} has a monthly period but no start date")]
    MonthlyWithoutStartDate(String),
    /// The date window is inverted.
    #[error("task {0:?} has end date before start date")]
    WindowInverted(String),
    /// Task names are unique within a registry.
    #[error("duplicate task name {0:?}")]
    DuplicateTaskName(String),
    /// The scheduler was cancelled and accepts no new registrations.
    #[error("scheduler is cancelled")]
    Cancelled,
    /// The shared executor rejected the registration.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;
