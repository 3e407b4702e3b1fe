//! Calendar-aware periodic task scheduling.
//!
//! Tasks are registered explicitly with a [`TaskDescriptor`] parsed from the
//! annotation shape (`HH:MM` time, `Nw|Nd|Nh|Nm|M` period, `YYYYMMDD`
//! window, day-of-week set). The [`TaskScheduler`] computes a deterministic
//! first fire in the configured timezone, registers fixed-rate jobs or
//! self-re-arming monthly one-shots on the shared executor, and re-checks
//! the date window and day-of-week at every fire; a tick outside the
//! calendar is skipped with a debug log, never dropped silently mid-series.
//!
//! # Examples
//!
//! ```rust,no_run
//! use edgekit_executor::ExecutorConfig;
//! use edgekit_scheduler::{SchedulerConfig, TaskDescriptor, TaskRegistry};
//!
//! # fn demo() -> Result<(), edgekit_scheduler::ScheduleError> {
//! let mut registry = TaskRegistry::new();
//! let descriptor = TaskDescriptor::builder("hourly-report")
//!     .time("00:05")?
//!     .period("1h")?
//!     .days_of_week("MON,WED,FRI")?
//!     .build()?;
//! registry.register_fn(descriptor, || Box::pin(async { Ok(()) }))?;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let executor = ExecutorConfig::builder().build();
//! let scheduler = SchedulerConfig::builder(executor).build();
//! scheduler.start(&registry)?;
//! # Ok::<(), edgekit_scheduler::ScheduleError>(())
//! # })?;
//! # Ok(())
//! # }
//! ```

mod descriptor;
mod error;
mod events;
mod registry;
mod scheduler;

pub use descriptor::{
    parse_date, parse_days, parse_time, Period, TaskDescriptor, TaskDescriptorBuilder,
};
pub use error::ScheduleError;
pub use events::SchedulerEvent;
pub use registry::{ScheduledTask, TaskRegistry};
pub use scheduler::{
    next_monthly_fire, next_periodic_fire, SchedulerConfig, SchedulerConfigBuilder, TaskScheduler,
};
