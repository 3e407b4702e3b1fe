//! Error types for the executor.

/// Errors that can occur when submitting work to the executor.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutorError {
    /// The executor has been shut down and accepts no new work.
    #[error("executor is shut down")]
    Shutdown,
}

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, ExecutorError>;
