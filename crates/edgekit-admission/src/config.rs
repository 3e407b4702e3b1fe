//! Configuration for the admission filter.

use crate::policy::{FilterPolicy, PolicyHandle};
use edgekit_health::HealthProbe;

/// Configuration for the admission filter.
#[derive(Clone)]
pub struct AdmissionConfig {
    /// Reloadable rule set.
    pub(crate) policy: PolicyHandle,
    /// Probe serving the health fast path.
    pub(crate) probe: HealthProbe,
    /// Name of this filter instance.
    pub(crate) name: String,
}

impl AdmissionConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AdmissionConfigBuilder {
        AdmissionConfigBuilder::new()
    }
}

/// Builder for admission configuration.
pub struct AdmissionConfigBuilder {
    policy: Option<PolicyHandle>,
    probe: Option<HealthProbe>,
    name: String,
}

impl AdmissionConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            policy: None,
            probe: None,
            name: "admission".to_string(),
        }
    }

    /// Sets the initial rule set.
    ///
    /// Default: [`FilterPolicy::default`]
    pub fn policy(mut self, policy: FilterPolicy) -> Self {
        self.policy = Some(PolicyHandle::new(policy));
        self
    }

    /// Shares an externally owned policy handle, so the embedding
    /// application can republish rules at runtime.
    pub fn policy_handle(mut self, handle: PolicyHandle) -> Self {
        self.policy = Some(handle);
        self
    }

    /// Sets the probe answering the health fast path.
    ///
    /// Default: a probe named "edge"
    pub fn probe(mut self, probe: HealthProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sets the name of this filter instance.
    ///
    /// Default: "admission"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the configuration and returns an
    /// [`AdmissionLayer`](crate::AdmissionLayer).
    pub fn build(self) -> crate::layer::AdmissionLayer {
        let config = AdmissionConfig {
            policy: self.policy.unwrap_or_default(),
            probe: self.probe.unwrap_or_else(|| HealthProbe::new("edge")),
            name: self.name,
        };
        crate::layer::AdmissionLayer::new(config)
    }
}

impl Default for AdmissionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
