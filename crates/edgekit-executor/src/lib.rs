//! Bounded worker pool and timer service for edgekit.
//!
//! Every long-running unit of work in the pipeline (scheduled task bodies,
//! cache drains, maintenance sweeps) runs on a [`TaskExecutor`]: a fixed set
//! of workers fed by a bounded queue. When the queue is full, submission
//! waits, so upstream components observe pressure instead of silently losing
//! work.
//!
//! # Examples
//!
//! ```rust,no_run
//! use edgekit_executor::{ExecutorConfig, TaskExecutor};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let executor = ExecutorConfig::builder()
//!     .workers(4)
//!     .queue_capacity(256)
//!     .build();
//!
//! executor.submit(async { /* work */ }).await.unwrap();
//!
//! let handle = executor
//!     .schedule_at_fixed_rate(
//!         || Box::pin(async { /* periodic work */ }),
//!         Duration::from_secs(1),
//!         Duration::from_secs(60),
//!     )
//!     .unwrap();
//!
//! handle.cancel();
//! executor.shutdown().await;
//! # }
//! ```

mod config;
mod error;
mod executor;
mod handle;

pub use config::{ExecutorConfig, ExecutorConfigBuilder};
pub use error::ExecutorError;
pub use executor::{ExecutorStats, TaskExecutor};
pub use handle::ScheduledHandle;

/// Boxed unit of work accepted by the executor.
pub type Job = futures::future::BoxFuture<'static, ()>;
