//! Fire-time computation and the scheduler itself.

use crate::descriptor::{Period, TaskDescriptor};
use crate::error::ScheduleError;
use crate::events::SchedulerEvent;
use crate::registry::{RegisteredTask, TaskRegistry};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use edgekit_core::EventListeners;
use edgekit_executor::{ScheduledHandle, TaskExecutor};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

#[cfg(feature = "metrics")]
use metrics::counter;

const DAY: Duration = Duration::from_secs(24 * 3600);

// Wall-clock resolution stepping forward over DST gaps.
fn resolve_local(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(resolved) => Some(resolved),
        None => tz
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest(),
    }
}

/// Computes the first fire instant for a fixed-interval task.
///
/// Sub-day intervals tick on a grid anchored at the scheduled time of day
/// (the fire-time wrapper skips disallowed days); intervals of a day or more
/// aim the first fire at the next valid day-of-week at the scheduled time,
/// searching up to a year ahead. The scheduled time equal to `now` counts as
/// already passed.
pub fn next_periodic_fire(descriptor: &TaskDescriptor, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let Period::Every(period) = descriptor.period else {
        return next_monthly_fire(descriptor, now);
    };
    let tz = now.timezone();
    let today = now.date_naive();

    let mut base_date = today;
    if let Some(start) = descriptor.start_date {
        if start > today {
            base_date = start;
        }
    }
    let base = resolve_local(&tz, base_date, descriptor.time)?;

    if period < DAY {
        if base > now {
            return Some(base);
        }
        // Next grid point strictly after now.
        let period_ms = period.as_millis() as i64;
        let elapsed_ms = (now - base).num_milliseconds();
        let steps = elapsed_ms / period_ms + 1;
        return base.checked_add_signed(chrono::Duration::milliseconds(steps * period_ms));
    }

    if base > now && descriptor.day_allowed(base_date.weekday()) {
        return Some(base);
    }
    for offset in 1..=365u64 {
        let candidate_date = base_date.checked_add_days(chrono::Days::new(offset))?;
        if !descriptor.day_allowed(candidate_date.weekday()) {
            continue;
        }
        let candidate = resolve_local(&tz, candidate_date, descriptor.time)?;
        if candidate > now {
            return Some(candidate);
        }
    }
    None
}

/// Computes the next monthly fire: the anchor day (clamped to short months)
/// at the scheduled time, advancing month by month while already passed.
/// Before the start date, the target is the start date itself.
pub fn next_monthly_fire(descriptor: &TaskDescriptor, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let start = descriptor.start_date?;
    let tz = now.timezone();
    let today = now.date_naive();

    if today < start {
        return resolve_local(&tz, start, descriptor.time);
    }

    let anchor = start.day();
    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..48 {
        let day = anchor.min(last_day_of_month(year, month));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if let Some(target) = resolve_local(&tz, date, descriptor.time) {
                if target > now {
                    return Some(target);
                }
            }
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    None
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Configuration for the scheduler.
#[derive(Clone)]
pub struct SchedulerConfig {
    pub(crate) executor: TaskExecutor,
    pub(crate) timezone: Tz,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<SchedulerEvent>,
}

impl SchedulerConfig {
    /// Creates a builder around the shared executor.
    pub fn builder(executor: TaskExecutor) -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::new(executor)
    }
}

/// Builder for scheduler configuration.
pub struct SchedulerConfigBuilder {
    executor: TaskExecutor,
    timezone: Tz,
    name: String,
    event_listeners: EventListeners<SchedulerEvent>,
}

impl SchedulerConfigBuilder {
    fn new(executor: TaskExecutor) -> Self {
        Self {
            executor,
            timezone: chrono_tz::Asia::Seoul,
            name: "scheduler".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the zone fire times are computed in.
    ///
    /// Default: `Asia/Seoul`
    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Parses an IANA zone string.
    pub fn timezone_name(mut self, name: &str) -> Result<Self, ScheduleError> {
        self.timezone = name
            .parse::<Tz>()
            .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))?;
        Ok(self)
    }

    /// Sets the name of this scheduler instance.
    ///
    /// Default: "scheduler"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a fire is handed to the executor.
    pub fn on_task_fired<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let SchedulerEvent::TaskFired { task, .. } = event {
                f(task);
            }
        });
        self
    }

    /// Registers a callback when a fire is skipped outside its window.
    pub fn on_task_skipped<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let SchedulerEvent::TaskSkipped { task, .. } = event {
                f(task);
            }
        });
        self
    }

    /// Registers a callback when a task body errors or panics.
    pub fn on_task_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let SchedulerEvent::TaskFailed { task, .. } = event {
                f(task);
            }
        });
        self
    }

    /// Builds the scheduler.
    pub fn build(self) -> TaskScheduler {
        let config = SchedulerConfig {
            executor: self.executor,
            timezone: self.timezone,
            name: self.name,
            event_listeners: self.event_listeners,
        };
        TaskScheduler {
            inner: Arc::new(SchedulerInner {
                config,
                cancelled: AtomicBool::new(false),
                rate_handles: Mutex::new(Vec::new()),
                monthly_handles: Mutex::new(Vec::new()),
            }),
        }
    }
}

struct SchedulerInner {
    config: SchedulerConfig,
    cancelled: AtomicBool,
    rate_handles: Mutex<Vec<ScheduledHandle>>,
    monthly_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Places registered tasks onto the shared executor's timer and enforces
/// calendar rules at fire time.
#[derive(Clone)]
pub struct TaskScheduler {
    inner: Arc<SchedulerInner>,
}

impl TaskScheduler {
    /// Schedules every enabled task whose date window still admits today.
    ///
    /// Returns the number of tasks placed on the timer. Tasks whose window
    /// has closed, or that have no valid fire day within a year, are logged
    /// and excluded; the rest proceed.
    pub fn start(&self, registry: &TaskRegistry) -> Result<usize, ScheduleError> {
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return Err(ScheduleError::Cancelled);
        }

        let mut scheduled = 0;
        for entry in registry.ordered_entries() {
            let descriptor = &entry.descriptor;
            tracing::info!(
                scheduler = %self.inner.config.name,
                task = %descriptor.name,
                priority = descriptor.priority,
                description = %descriptor.description,
                "discovered scheduled task"
            );
            if !descriptor.enabled {
                tracing::debug!(task = %descriptor.name, "task disabled, not scheduled");
                continue;
            }

            let now = Utc::now().with_timezone(&self.inner.config.timezone);
            let today = now.date_naive();
            if let Some(end) = descriptor.end_date {
                if end < today {
                    tracing::info!(task = %descriptor.name, "date window closed, not scheduled");
                    continue;
                }
            }

            match descriptor.period {
                Period::Every(period) => {
                    let Some(fire_at) = next_periodic_fire(descriptor, now) else {
                        tracing::error!(
                            task = %descriptor.name,
                            "no valid fire day within a year, task excluded"
                        );
                        continue;
                    };
                    let delay = (fire_at - now).to_std().unwrap_or(Duration::ZERO);
                    let inner = Arc::clone(&self.inner);
                    let fire_entry = entry.clone();
                    let handle = self.inner.config.executor.schedule_at_fixed_rate(
                        move || fire_job(Arc::clone(&inner), fire_entry.clone()),
                        delay,
                        period,
                    )?;
                    self.inner.rate_handles.lock().push(handle);
                }
                Period::Monthly => {
                    let join = self.spawn_monthly(entry.clone());
                    self.inner.monthly_handles.lock().push(join);
                }
            }

            scheduled += 1;
            self.inner.config.event_listeners.emit(&SchedulerEvent::TaskScheduled {
                scheduler_name: self.inner.config.name.clone(),
                timestamp: std::time::Instant::now(),
                task: descriptor.name.clone(),
            });
        }
        Ok(scheduled)
    }

    // One-shot per anchor, re-armed after each fire.
    fn spawn_monthly(&self, entry: RegisteredTask) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                let now = Utc::now().with_timezone(&inner.config.timezone);
                let Some(fire_at) = next_monthly_fire(&entry.descriptor, now) else {
                    tracing::warn!(task = %entry.descriptor.name, "no next monthly fire");
                    break;
                };
                let delay = (fire_at - now).to_std().unwrap_or(Duration::ZERO);
                tokio::time::sleep(delay).await;
                if inner.cancelled.load(Ordering::SeqCst) {
                    break;
                }
                let job = fire_job(Arc::clone(&inner), entry.clone());
                if inner.config.executor.submit_job(job).await.is_err() {
                    tracing::debug!(
                        task = %entry.descriptor.name,
                        "executor shut down, stopping monthly timer"
                    );
                    break;
                }
            }
        })
    }

    /// Cancels every registered handle.
    ///
    /// Fires already dispatched to the executor run to completion; no new
    /// fires occur after this returns, and later `start` calls are rejected.
    pub fn cancel_all(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        for handle in self.inner.rate_handles.lock().drain(..) {
            handle.cancel();
        }
        for join in self.inner.monthly_handles.lock().drain(..) {
            join.abort();
        }
        tracing::info!(scheduler = %self.inner.config.name, "all scheduled tasks cancelled");
    }

    /// True once `cancel_all` has run.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// The zone fire times are computed in.
    pub fn timezone(&self) -> Tz {
        self.inner.config.timezone
    }
}

// The fire-time wrapper: re-check the calendar, then hand the body to the
// pool. The timer never blocks on task execution.
fn fire_job(inner: Arc<SchedulerInner>, entry: RegisteredTask) -> futures::future::BoxFuture<'static, ()> {
    Box::pin(async move {
        let descriptor = &entry.descriptor;
        let today = Utc::now().with_timezone(&inner.config.timezone).date_naive();

        if !descriptor.window_admits(today) || !descriptor.day_allowed(today.weekday()) {
            tracing::debug!(
                scheduler = %inner.config.name,
                task = %descriptor.name,
                "fire skipped outside date window or day set"
            );
            inner.config.event_listeners.emit(&SchedulerEvent::TaskSkipped {
                scheduler_name: inner.config.name.clone(),
                timestamp: std::time::Instant::now(),
                task: descriptor.name.clone(),
            });

            #[cfg(feature = "metrics")]
            counter!("scheduler_fires_skipped_total", "scheduler" => inner.config.name.clone())
                .increment(1);
            return;
        }

        inner.config.event_listeners.emit(&SchedulerEvent::TaskFired {
            scheduler_name: inner.config.name.clone(),
            timestamp: std::time::Instant::now(),
            task: descriptor.name.clone(),
        });

        #[cfg(feature = "metrics")]
        counter!("scheduler_fires_total", "scheduler" => inner.config.name.clone()).increment(1);

        let outcome = std::panic::AssertUnwindSafe(entry.task.run())
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!(
                    scheduler = %inner.config.name,
                    task = %descriptor.name,
                    error = %error,
                    detail = ?error,
                    "scheduled task failed"
                );
                inner.config.event_listeners.emit(&SchedulerEvent::TaskFailed {
                    scheduler_name: inner.config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    task: descriptor.name.clone(),
                });
            }
            Err(_) => {
                tracing::warn!(
                    scheduler = %inner.config.name,
                    task = %descriptor.name,
                    "scheduled task panicked"
                );
                inner.config.event_listeners.emit(&SchedulerEvent::TaskFailed {
                    scheduler_name: inner.config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    task: descriptor.name.clone(),
                });
            }
        }
    })
}
