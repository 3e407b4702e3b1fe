//! Configuration for the connection gate.

use crate::events::GateEvent;
use edgekit_core::EventListeners;

/// Configuration for the connection gate.
#[derive(Clone)]
pub struct GateConfig {
    /// Maximum live connections per remote IP.
    pub(crate) max_per_ip: usize,
    /// Name of this gate instance.
    pub(crate) name: String,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<GateEvent>,
}

impl GateConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GateConfigBuilder {
        GateConfigBuilder::new()
    }
}

/// Builder for gate configuration.
pub struct GateConfigBuilder {
    max_per_ip: usize,
    name: String,
    event_listeners: EventListeners<GateEvent>,
}

impl GateConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_per_ip: 100,
            name: "gate".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the maximum live connections per remote IP.
    ///
    /// Default: 100
    pub fn max_per_ip(mut self, max: usize) -> Self {
        self.max_per_ip = max.max(1);
        self
    }

    /// Sets the name of this gate instance.
    ///
    /// Default: "gate"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a connection is accepted.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - the remote IP and its live-connection count after
    /// the accept.
    pub fn on_accepted<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let GateEvent::ConnectionAccepted { ip, total, .. } = event {
                f(ip, *total);
            }
        });
        self
    }

    /// Registers a callback when a connection is rejected over the limit.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - the remote IP and the counter value observed at
    /// rejection time.
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let GateEvent::ConnectionRejected { ip, current, .. } = event {
                f(ip, *current);
            }
        });
        self
    }

    /// Builds the configuration and returns a [`GateLayer`](crate::GateLayer).
    pub fn build(self) -> crate::layer::GateLayer {
        let config = GateConfig {
            max_per_ip: self.max_per_ip,
            name: self.name,
            event_listeners: self.event_listeners,
        };
        crate::layer::GateLayer::new(config)
    }
}

impl Default for GateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
