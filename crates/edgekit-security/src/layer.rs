//! Tower layer implementation for the security filter.

use crate::config::SecurityConfig;
use crate::ledger::AttackLedger;
use crate::service::Security;
use std::sync::Arc;
use tower::Layer;

#[cfg(feature = "metrics")]
use metrics::describe_counter;
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Layer that applies injection detection and adaptive blacklisting.
#[derive(Clone)]
pub struct SecurityLayer {
    config: SecurityConfig,
    ledger: Arc<AttackLedger>,
}

impl SecurityLayer {
    /// Creates a new security layer with the given configuration.
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            config,
            ledger: Arc::new(AttackLedger::new()),
        }
    }

    /// Creates a new builder for configuring a security layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use edgekit_security::SecurityLayer;
    /// use std::time::Duration;
    ///
    /// let layer = SecurityLayer::builder()
    ///     .max_attempts_before_block(5)
    ///     .blacklist_duration(Duration::from_secs(600))
    ///     .build();
    /// ```
    pub fn builder() -> crate::SecurityConfigBuilder {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "security_attacks_detected_total",
                    "Total requests matching an attack pattern family"
                );
                describe_counter!(
                    "security_ips_blacklisted_total",
                    "Total IPs blacklisted for repeated attacks"
                );
                describe_counter!(
                    "security_blacklisted_blocked_total",
                    "Total requests blocked from currently blacklisted IPs"
                );
            });
        }
        crate::SecurityConfigBuilder::new()
    }

    /// The shared attack ledger, for diagnostics and tests.
    pub fn ledger(&self) -> &Arc<AttackLedger> {
        &self.ledger
    }
}

impl<S> Layer<S> for SecurityLayer {
    type Service = Security<S>;

    fn layer(&self, service: S) -> Self::Service {
        Security::new(service, self.config.clone(), Arc::clone(&self.ledger))
    }
}
