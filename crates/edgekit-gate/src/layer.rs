//! Tower layer implementation for the connection gate.

use crate::config::GateConfig;
use crate::gate::ConnectionGate;
use crate::service::Gate;
use tower::Layer;

#[cfg(feature = "metrics")]
use metrics::describe_counter;
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Layer that applies per-IP connection limiting.
#[derive(Clone)]
pub struct GateLayer {
    gate: ConnectionGate,
}

impl GateLayer {
    /// Creates a new gate layer with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        Self {
            gate: ConnectionGate::new(config),
        }
    }

    /// Creates a new builder for configuring a gate layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use edgekit_gate::GateLayer;
    ///
    /// let layer = GateLayer::builder()
    ///     .max_per_ip(3)
    ///     .build();
    /// ```
    pub fn builder() -> crate::GateConfigBuilder {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "gate_connections_accepted_total",
                    "Total number of connections accepted by the gate"
                );
                describe_counter!(
                    "gate_connections_rejected_total",
                    "Total number of connections rejected over the per-IP limit"
                );
            });
        }
        crate::GateConfigBuilder::new()
    }

    /// Preset: strict gate for hostile networks.
    ///
    /// Configuration:
    /// - 3 concurrent connections per IP
    pub fn strict() -> crate::GateConfigBuilder {
        Self::builder().max_per_ip(3)
    }

    /// Preset: permissive gate for trusted pools and proxies.
    ///
    /// Configuration:
    /// - 1000 concurrent connections per IP
    pub fn permissive() -> crate::GateConfigBuilder {
        Self::builder().max_per_ip(1000)
    }

    /// The shared gate core, for transports that count raw socket accepts.
    pub fn gate(&self) -> &ConnectionGate {
        &self.gate
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = Gate<S>;

    fn layer(&self, service: S) -> Self::Service {
        Gate::new(service, self.gate.clone())
    }
}
