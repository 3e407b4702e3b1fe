//! Wiring and ordered shutdown for the whole runtime.

use crate::config::EdgeConfig;
use edgekit_admission::{AdmissionConfig, AdmissionLayer, PolicyHandle};
use edgekit_cache::{CacheConfig, TimeoutCache};
use edgekit_compression::{CompressionConfig, CompressionLayer};
use edgekit_core::CoarseClock;
use edgekit_executor::{ExecutorConfig, ScheduledHandle, TaskExecutor};
use edgekit_gate::{GateConfig, GateLayer};
use edgekit_health::{HealthProbe, TaskCounters};
use edgekit_pubsub::Bus;
use edgekit_scheduler::{ScheduleError, SchedulerConfig, TaskRegistry, TaskScheduler};
use edgekit_security::{SecurityConfig, SecurityLayer};
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

type FlushHook = Box<dyn Fn() + Send + Sync>;

struct RuntimeInner {
    config: EdgeConfig,
    clock: CoarseClock,
    clock_task: Mutex<Option<JoinHandle<()>>>,
    executor: TaskExecutor,
    scheduler: TaskScheduler,
    bus: Bus,
    probe: HealthProbe,
    policy: PolicyHandle,
    maintenance: Mutex<Vec<(ScheduledHandle, FlushHook)>>,
    shut_down: AtomicBool,
}

/// Owns the shared services of the runtime and tears them down in order:
/// cancel the scheduler, drain the executor, flush caches and run their
/// final expiry callbacks, then stop the clock. (Transports stop accepting
/// connections before calling [`shutdown`](Self::shutdown).)
#[derive(Clone)]
pub struct EdgeRuntime {
    inner: Arc<RuntimeInner>,
}

impl EdgeRuntime {
    /// Builds the shared services from a configuration.
    ///
    /// Must run inside a tokio runtime; the coarse clock refresher and the
    /// executor workers are spawned immediately.
    pub fn from_config(config: EdgeConfig) -> Result<Self, ScheduleError> {
        let clock = CoarseClock::new();
        let clock_task = clock.start();

        let executor = ExecutorConfig::builder().name("edge-executor").build();
        let scheduler = SchedulerConfig::builder(executor.clone())
            .timezone_name(&config.task.timezone)?
            .name("edge-scheduler")
            .build();

        let counters = executor.clone();
        let probe = HealthProbe::with_task_counters(
            "edge",
            Arc::new(move || {
                let stats = counters.stats();
                TaskCounters {
                    workers: stats.workers,
                    queued: stats.queued,
                    in_flight: stats.in_flight,
                    completed: stats.completed,
                }
            }),
        );

        let policy = PolicyHandle::new(config.filter_policy());

        Ok(Self {
            inner: Arc::new(RuntimeInner {
                clock,
                clock_task: Mutex::new(Some(clock_task)),
                executor,
                scheduler,
                bus: Bus::new(),
                probe,
                policy,
                maintenance: Mutex::new(Vec::new()),
                shut_down: AtomicBool::new(false),
                config,
            }),
        })
    }

    /// The process coarse clock.
    pub fn clock(&self) -> &CoarseClock {
        &self.inner.clock
    }

    /// The shared executor.
    pub fn executor(&self) -> &TaskExecutor {
        &self.inner.executor
    }

    /// The task scheduler.
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.inner.scheduler
    }

    /// The pub/sub bus.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// The health probe.
    pub fn probe(&self) -> &HealthProbe {
        &self.inner.probe
    }

    /// The reloadable admission policy.
    pub fn policy(&self) -> &PolicyHandle {
        &self.inner.policy
    }

    /// The configuration the runtime was built from.
    pub fn config(&self) -> &EdgeConfig {
        &self.inner.config
    }

    /// A gate layer bound to this runtime's configuration.
    pub fn gate_layer(&self) -> GateLayer {
        GateConfig::builder()
            .max_per_ip(self.inner.config.max_connections_per_ip)
            .name("edge-gate")
            .build()
    }

    /// An admission layer sharing this runtime's policy and probe.
    pub fn admission_layer(&self) -> AdmissionLayer {
        AdmissionConfig::builder()
            .policy_handle(self.inner.policy.clone())
            .probe(self.inner.probe.clone())
            .build()
    }

    /// A security layer sharing this runtime's clock.
    pub fn security_layer(&self) -> SecurityLayer {
        SecurityConfig::builder()
            .max_attempts_before_block(self.inner.config.max_attempts_before_block)
            .blacklist_duration(Duration::from_secs(
                self.inner.config.blacklist_duration_seconds,
            ))
            .clock(self.inner.clock.clone())
            .name("edge-security")
            .build()
    }

    /// A compression layer bound to this runtime's configuration.
    pub fn compression_layer(&self) -> CompressionLayer {
        let section = &self.inner.config.compression;
        let mut builder = CompressionConfig::builder().threshold(section.threshold);
        if !section.excluded_mime_types.is_empty() {
            builder = builder.excluded_mime_types(section.excluded_mime_types.clone());
        }
        builder.name("edge-compression").build()
    }

    /// Builds a cache on this runtime's clock, with maintenance scheduled on
    /// the shared executor and a final flush registered for shutdown.
    pub fn cache<K, V>(&self, name: impl Into<String>) -> TimeoutCache<K, V>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let section = &self.inner.config.cache;
        let cache: TimeoutCache<K, V> = CacheConfig::builder()
            .name(name)
            .ttl(Duration::from_secs(section.expire_minutes * 60))
            .max_size(section.max_size)
            .clock(self.inner.clock.clone())
            .build();

        if let Ok(handle) = cache.start_maintenance(&self.inner.executor) {
            let flush = cache.clone();
            self.inner
                .maintenance
                .lock()
                .push((handle, Box::new(move || flush.maintenance())));
        }
        cache
    }

    /// Schedules every task in the registry.
    pub fn start_tasks(&self, registry: &TaskRegistry) -> Result<usize, ScheduleError> {
        self.inner.scheduler.start(registry)
    }

    /// Tears the runtime down in order. Idempotent.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.inner.scheduler.cancel_all();
        self.inner.executor.shutdown().await;

        // Final drain and sweep, running outstanding expiry callbacks.
        for (handle, flush) in self.inner.maintenance.lock().drain(..) {
            handle.cancel();
            flush();
        }

        let open = self.inner.bus.open_subscribers();
        if open > 0 {
            tracing::warn!(open_subscribers = open, "subscribers left open at shutdown");
        }

        if let Some(task) = self.inner.clock_task.lock().take() {
            task.abort();
        }
        tracing::info!("edge runtime shut down");
    }
}
