//! Configuration for the executor.

use std::time::Duration;

/// Configuration for a [`TaskExecutor`](crate::TaskExecutor).
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of pool workers.
    pub(crate) workers: usize,
    /// Bounded work queue capacity.
    pub(crate) queue_capacity: usize,
    /// How long shutdown waits for in-flight work before aborting it.
    pub(crate) shutdown_grace: Duration,
    /// Name of this executor instance.
    pub(crate) name: String,
}

impl ExecutorConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new()
    }
}

/// Builder for executor configuration.
pub struct ExecutorConfigBuilder {
    workers: usize,
    queue_capacity: usize,
    shutdown_grace: Duration,
    name: String,
}

impl ExecutorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            shutdown_grace: Duration::from_secs(5),
            name: "executor".to_string(),
        }
    }

    /// Sets the number of pool workers.
    ///
    /// Default: 4
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the bounded work queue capacity.
    ///
    /// A full queue blocks submitters rather than dropping work.
    /// Default: 1024
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Sets how long shutdown waits for in-flight work before aborting.
    ///
    /// Default: 5 seconds
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Sets the name of this executor instance.
    ///
    /// Default: "executor"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the configuration and spawns the worker pool on the current
    /// tokio runtime.
    pub fn build(self) -> crate::TaskExecutor {
        let config = ExecutorConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            shutdown_grace: self.shutdown_grace,
            name: self.name,
        };
        crate::TaskExecutor::new(config)
    }
}

impl Default for ExecutorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
