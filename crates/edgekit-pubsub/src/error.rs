//! Error types for the bus.

/// Errors surfaced by pub/sub operations.
#[derive(Debug, thiserror::Error)]
pub enum PubSubError {
    /// The remote transport failed to accept a publication.
    #[error("transport publish failed: {0}")]
    Transport(String),
}

/// Result type for pub/sub operations.
pub type Result<T> = std::result::Result<T, PubSubError>;
