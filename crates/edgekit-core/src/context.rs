//! Per-request context threaded through the pipeline.
//!
//! The transport inserts [`PeerAddr`] when it accepts a connection; the
//! admission filter derives a [`RequestContext`] from it before any stage
//! runs. Both live in the request's `http::Extensions`, so downstream
//! stages and the business handler read one consistent snapshot instead of
//! consulting thread-locals.

use std::net::IpAddr;
use std::time::Instant;

/// The remote peer address, as observed by the transport.
///
/// `None` means the transport could not determine the peer (for example a
/// unix socket or a misbehaving proxy header). Consumers must treat unknown
/// peers as one shared bucket, never as unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddr(pub Option<IpAddr>);

impl PeerAddr {
    /// Returns the peer IP rendered for log lines and per-IP keys.
    pub fn display_key(&self) -> String {
        match self.0 {
            Some(ip) => ip.to_string(),
            None => "unknown".to_string(),
        }
    }
}

/// Request attributes captured before the first filter stage.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Remote peer IP, or "unknown".
    pub remote_ip: String,
    /// Declared or actual body length in bytes.
    pub content_length: u64,
    /// Request method, as sent.
    pub method: String,
    /// Request URI, as sent.
    pub uri: String,
    /// Monotonic start timestamp for latency accounting.
    pub started_at: Instant,
}

impl RequestContext {
    /// Creates a context stamped with the current instant.
    pub fn new(remote_ip: String, content_length: u64, method: String, uri: String) -> Self {
        Self {
            remote_ip,
            content_length,
            method,
            uri,
            started_at: Instant::now(),
        }
    }

    /// Elapsed time since the context was created.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}
