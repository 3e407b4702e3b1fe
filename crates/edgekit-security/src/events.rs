//! Events emitted by the security filter.

use crate::patterns::AttackKind;
use edgekit_core::EdgeEvent;
use std::time::Instant;

/// Events emitted by a [`Security`](crate::Security) filter.
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    /// A pattern family matched the request.
    AttackDetected {
        /// Filter instance name.
        filter_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Remote IP (or "unknown").
        ip: String,
        /// Matched family.
        kind: AttackKind,
        /// Attempt count after this detection.
        attempts: u32,
    },
    /// An IP crossed the attempt threshold and was blacklisted.
    Blacklisted {
        /// Filter instance name.
        filter_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Remote IP (or "unknown").
        ip: String,
        /// Absolute-ms deadline of the blacklist entry.
        until_ms: u64,
    },
    /// A request from a currently blacklisted IP was blocked.
    Blocked {
        /// Filter instance name.
        filter_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Remote IP (or "unknown").
        ip: String,
    },
}

impl EdgeEvent for SecurityEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SecurityEvent::AttackDetected { .. } => "attack_detected",
            SecurityEvent::Blacklisted { .. } => "ip_blacklisted",
            SecurityEvent::Blocked { .. } => "blacklisted_ip_blocked",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SecurityEvent::AttackDetected { timestamp, .. }
            | SecurityEvent::Blacklisted { timestamp, .. }
            | SecurityEvent::Blocked { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            SecurityEvent::AttackDetected { filter_name, .. }
            | SecurityEvent::Blacklisted { filter_name, .. }
            | SecurityEvent::Blocked { filter_name, .. } => filter_name,
        }
    }
}
