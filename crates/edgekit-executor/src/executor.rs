//! Worker pool implementation.

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::handle::ScheduledHandle;
use crate::Job;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Point-in-time executor statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Number of pool workers.
    pub workers: usize,
    /// Jobs waiting in the queue.
    pub queued: usize,
    /// Jobs currently running on workers.
    pub in_flight: usize,
    /// Total jobs accepted since construction.
    pub submitted: u64,
    /// Total jobs that ran to completion.
    pub completed: u64,
}

struct Inner {
    config: ExecutorConfig,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
    queued: AtomicUsize,
    in_flight: AtomicUsize,
    submitted: AtomicU64,
    completed: AtomicU64,
}

/// Bounded worker pool with a scheduled timer service.
///
/// Submission applies backpressure: when the work queue is full, the caller
/// waits for a slot instead of the job being dropped. Scheduled work returns
/// a [`ScheduledHandle`] whose `cancel` suppresses fires that have not yet
/// been dispatched.
#[derive(Clone)]
pub struct TaskExecutor {
    inner: Arc<Inner>,
}

impl TaskExecutor {
    /// Creates the executor and spawns its workers on the current runtime.
    pub(crate) fn new(config: ExecutorConfig) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let inner = Arc::new(Inner {
            config,
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
            queued: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        });

        let mut handles = Vec::with_capacity(inner.config.workers);
        for _ in 0..inner.config.workers {
            let rx = Arc::clone(&rx);
            let inner = Arc::clone(&inner);
            handles.push(tokio::spawn(async move {
                loop {
                    // Do not hold the receiver lock while the job runs.
                    let job = { rx.lock().await.recv().await };
                    match job {
                        Some(job) => {
                            inner.queued.fetch_sub(1, Ordering::SeqCst);
                            inner.in_flight.fetch_add(1, Ordering::SeqCst);

                            #[cfg(feature = "metrics")]
                            gauge!("executor_in_flight", "executor" => inner.config.name.clone())
                                .set(inner.in_flight.load(Ordering::SeqCst) as f64);

                            // A panicking job must not take the worker with it.
                            let result = std::panic::AssertUnwindSafe(job).catch_unwind().await;
                            if result.is_err() {
                                tracing::warn!(
                                    executor = %inner.config.name,
                                    "job panicked on the worker pool"
                                );
                            }

                            inner.in_flight.fetch_sub(1, Ordering::SeqCst);
                            inner.completed.fetch_add(1, Ordering::SeqCst);
                        }
                        None => break,
                    }
                }
            }));
        }

        // No contention possible before `new` returns, so try_lock cannot fail.
        if let Ok(mut guard) = inner.workers.try_lock() {
            guard.extend(handles);
        }

        Self { inner }
    }

    /// Submits a job, waiting for queue space when the pool is saturated.
    pub async fn submit<F>(&self, future: F) -> Result<(), ExecutorError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.submit_job(Box::pin(future)).await
    }

    /// Submits a boxed job (see [`submit`](Self::submit)).
    pub async fn submit_job(&self, job: Job) -> Result<(), ExecutorError> {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return Err(ExecutorError::Shutdown);
        }

        let sender = {
            let guard = self.inner.sender.lock().await;
            guard.clone().ok_or(ExecutorError::Shutdown)?
        };

        self.inner.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(job).await.is_err() {
            self.inner.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(ExecutorError::Shutdown);
        }
        self.inner.submitted.fetch_add(1, Ordering::SeqCst);

        #[cfg(feature = "metrics")]
        counter!("executor_jobs_submitted_total", "executor" => self.inner.config.name.clone())
            .increment(1);

        Ok(())
    }

    /// Schedules a one-shot job to be submitted after `delay`.
    pub fn schedule<F>(&self, future: F, delay: Duration) -> Result<ScheduledHandle, ExecutorError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return Err(ExecutorError::Shutdown);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let executor = self.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if flag.load(Ordering::SeqCst) {
                return;
            }
            if executor.submit(future).await.is_err() {
                tracing::debug!("executor shut down before one-shot fire");
            }
        });

        Ok(ScheduledHandle::new(cancelled, timer))
    }

    /// Schedules `factory` to produce a job at a fixed rate.
    ///
    /// The first fire happens after `initial_delay`, subsequent fires every
    /// `period`. A tick that lands while the previous job still occupies the
    /// queue simply waits its turn; ticks are never dropped by the timer.
    pub fn schedule_at_fixed_rate<F>(
        &self,
        factory: F,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<ScheduledHandle, ExecutorError>
    where
        F: Fn() -> Job + Send + Sync + 'static,
    {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return Err(ExecutorError::Shutdown);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let executor = self.clone();

        let timer = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + initial_delay;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if executor.submit_job(factory()).await.is_err() {
                    tracing::debug!("executor shut down, stopping fixed-rate timer");
                    break;
                }
            }
        });

        Ok(ScheduledHandle::new(cancelled, timer))
    }

    /// Shuts the pool down: stops intake, lets workers drain the queue for
    /// the configured grace period, then aborts whatever is left.
    ///
    /// Idempotent; concurrent callers after the first return immediately.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        // Dropping the sender closes the channel once queued jobs are drained.
        self.inner.sender.lock().await.take();

        let workers: Vec<JoinHandle<()>> = {
            let mut guard = self.inner.workers.lock().await;
            guard.drain(..).collect()
        };
        let aborts: Vec<_> = workers.iter().map(|h| h.abort_handle()).collect();

        let grace = self.inner.config.shutdown_grace;
        if tokio::time::timeout(grace, futures::future::join_all(workers))
            .await
            .is_err()
        {
            tracing::warn!(
                executor = %self.inner.config.name,
                grace_ms = grace.as_millis() as u64,
                "executor shutdown grace elapsed, aborting remaining work"
            );
            for abort in aborts {
                abort.abort();
            }
        }
    }

    /// Returns true once shutdown has begun.
    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    /// Returns a point-in-time snapshot of pool counters.
    pub fn stats(&self) -> ExecutorStats {
        ExecutorStats {
            workers: self.inner.config.workers,
            queued: self.inner.queued.load(Ordering::SeqCst),
            in_flight: self.inner.in_flight.load(Ordering::SeqCst),
            submitted: self.inner.submitted.load(Ordering::SeqCst),
            completed: self.inner.completed.load(Ordering::SeqCst),
        }
    }

    /// Name of this executor instance.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }
}
