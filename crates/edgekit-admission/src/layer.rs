//! Tower layer implementation for the admission filter.

use crate::config::AdmissionConfig;
use crate::policy::PolicyHandle;
use crate::service::Admission;
use tower::Layer;

/// Layer that applies staged request admission.
#[derive(Clone)]
pub struct AdmissionLayer {
    config: AdmissionConfig,
}

impl AdmissionLayer {
    /// Creates a new admission layer with the given configuration.
    pub fn new(config: AdmissionConfig) -> Self {
        Self { config }
    }

    /// Creates a new builder for configuring an admission layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use edgekit_admission::{AdmissionLayer, FilterPolicy};
    ///
    /// let layer = AdmissionLayer::builder()
    ///     .policy(FilterPolicy {
    ///         denied_ip_prefixes: vec!["192.168.".into()],
    ///         ..FilterPolicy::default()
    ///     })
    ///     .build();
    /// ```
    pub fn builder() -> crate::AdmissionConfigBuilder {
        crate::AdmissionConfigBuilder::new()
    }

    /// The policy handle, for republishing rules at runtime.
    pub fn policy(&self) -> &PolicyHandle {
        &self.config.policy
    }
}

impl<S> Layer<S> for AdmissionLayer {
    type Service = Admission<S>;

    fn layer(&self, service: S) -> Self::Service {
        Admission::new(service, self.config.clone())
    }
}
