//! Configuration for the security filter.

use crate::events::SecurityEvent;
use crate::patterns::AttackKind;
use edgekit_core::{CoarseClock, EventListeners};
use std::time::Duration;

/// Configuration for the security filter.
#[derive(Clone)]
pub struct SecurityConfig {
    /// Detections before an IP is blacklisted.
    pub(crate) max_attempts_before_block: u32,
    /// How long a blacklist entry holds.
    pub(crate) blacklist_duration: Duration,
    /// Name of this filter instance.
    pub(crate) name: String,
    /// Clock used for deadlines (always the exact reading).
    pub(crate) clock: CoarseClock,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<SecurityEvent>,
}

impl SecurityConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SecurityConfigBuilder {
        SecurityConfigBuilder::new()
    }
}

/// Builder for security filter configuration.
pub struct SecurityConfigBuilder {
    max_attempts_before_block: u32,
    blacklist_duration: Duration,
    name: String,
    clock: Option<CoarseClock>,
    event_listeners: EventListeners<SecurityEvent>,
}

impl SecurityConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_attempts_before_block: 5,
            blacklist_duration: Duration::from_secs(600),
            name: "security".to_string(),
            clock: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the number of detections before an IP is blacklisted.
    ///
    /// Default: 5
    pub fn max_attempts_before_block(mut self, attempts: u32) -> Self {
        self.max_attempts_before_block = attempts.max(1);
        self
    }

    /// Sets how long a blacklist entry holds.
    ///
    /// Default: 600 seconds
    pub fn blacklist_duration(mut self, duration: Duration) -> Self {
        self.blacklist_duration = duration;
        self
    }

    /// Sets the name of this filter instance.
    ///
    /// Default: "security"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Shares the process clock. Deadlines always use its exact reading.
    pub fn clock(mut self, clock: CoarseClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Registers a callback when a pattern family matches a request.
    ///
    /// # Callback Signature
    /// `Fn(&str, AttackKind, u32)` - the remote IP, the matched family, and
    /// the attempt count after this detection.
    pub fn on_attack_detected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, AttackKind, u32) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let SecurityEvent::AttackDetected {
                ip, kind, attempts, ..
            } = event
            {
                f(ip, *kind, *attempts);
            }
        });
        self
    }

    /// Registers a callback when an IP crosses the threshold and is
    /// blacklisted.
    ///
    /// # Callback Signature
    /// `Fn(&str, u64)` - the remote IP and the absolute-ms deadline.
    pub fn on_blacklisted<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, u64) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event| {
            if let SecurityEvent::Blacklisted { ip, until_ms, .. } = event {
                f(ip, *until_ms);
            }
        });
        self
    }

    /// Builds the configuration and returns a
    /// [`SecurityLayer`](crate::SecurityLayer).
    pub fn build(self) -> crate::layer::SecurityLayer {
        let config = SecurityConfig {
            max_attempts_before_block: self.max_attempts_before_block,
            blacklist_duration: self.blacklist_duration,
            name: self.name,
            clock: self.clock.unwrap_or_default(),
            event_listeners: self.event_listeners,
        };
        crate::layer::SecurityLayer::new(config)
    }
}

impl Default for SecurityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
