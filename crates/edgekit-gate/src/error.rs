//! Error types for the connection gate.

/// Errors produced by the connection gate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GateError {
    /// The remote IP is over its concurrent-connection limit.
    ///
    /// The transport closes the socket without writing a response.
    #[error("connection limit exceeded for IP: {ip} (current: {current})")]
    LimitExceeded {
        /// Remote IP (or "unknown").
        ip: String,
        /// Counter value observed at rejection time.
        current: usize,
    },
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
