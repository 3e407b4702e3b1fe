//! Events emitted by the connection gate.

use edgekit_core::EdgeEvent;
use std::time::Instant;

/// Events emitted by a [`ConnectionGate`](crate::ConnectionGate).
#[derive(Debug, Clone)]
pub enum GateEvent {
    /// A connection was accepted and counted.
    ConnectionAccepted {
        /// Gate instance name.
        gate_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Remote IP (or "unknown").
        ip: String,
        /// Live connections for this IP after the accept.
        total: usize,
    },
    /// A connection was rejected for exceeding the per-IP limit.
    ConnectionRejected {
        /// Gate instance name.
        gate_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Remote IP (or "unknown").
        ip: String,
        /// Counter value observed at rejection time.
        current: usize,
    },
    /// A permit was released.
    ConnectionReleased {
        /// Gate instance name.
        gate_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Remote IP (or "unknown").
        ip: String,
    },
}

impl EdgeEvent for GateEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GateEvent::ConnectionAccepted { .. } => "connection_accepted",
            GateEvent::ConnectionRejected { .. } => "connection_rejected",
            GateEvent::ConnectionReleased { .. } => "connection_released",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            GateEvent::ConnectionAccepted { timestamp, .. }
            | GateEvent::ConnectionRejected { timestamp, .. }
            | GateEvent::ConnectionReleased { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            GateEvent::ConnectionAccepted { gate_name, .. }
            | GateEvent::ConnectionRejected { gate_name, .. }
            | GateEvent::ConnectionReleased { gate_name, .. } => gate_name,
        }
    }
}
