//! Observability events.
//!
//! Every pipeline component reports what it does through a small event
//! channel: the component defines an event enum implementing [`EdgeEvent`],
//! its config builder exposes `on_*` hooks, and each hook lands here as a
//! plain closure. There is no listener trait to implement; closures are the
//! only registration form the builders produce, so they are the only form
//! the channel stores.
//!
//! Emission is synchronous, in registration order, and isolated per
//! observer: one observer blowing up never hides the event from the rest.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Implemented by each component's event enum.
pub trait EdgeEvent: Send + Sync + fmt::Debug {
    /// Stable snake_case tag, e.g. `"connection_rejected"` or `"cache_hit"`.
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the component instance that emitted the event.
    fn component_name(&self) -> &str;
}

type Observer<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered observer set for one event type.
///
/// Cloning is shallow: a config cloned into several service instances keeps
/// a single shared set, so hooks registered at build time see events from
/// every clone.
pub struct EventListeners<E> {
    observers: Vec<Observer<E>>,
}

impl<E: EdgeEvent> EventListeners<E> {
    /// Creates an empty observer set.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Registers an observer closure.
    pub fn add<F>(&mut self, observer: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    /// Delivers `event` to every observer, in registration order.
    ///
    /// A panicking observer is caught, logged at warn with its panic
    /// message, and (with the `metrics` feature) counted; delivery then
    /// continues with the remaining observers.
    pub fn emit(&self, event: &E) {
        for (index, observer) in self.observers.iter().enumerate() {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                observer(event);
            }));
            if let Err(payload) = outcome {
                let message = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic payload>");
                tracing::warn!(
                    observer_index = index,
                    component = event.component_name(),
                    event_type = event.event_type(),
                    panic_message = %message,
                    "event listener panicked, continuing with the rest"
                );

                #[cfg(feature = "metrics")]
                metrics::counter!(
                    "edge_event_listener_panics_total",
                    "component" => event.component_name().to_string(),
                    "event_type" => event.event_type()
                )
                .increment(1);
            }
        }
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }
}

impl<E: EdgeEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl: observers are shared, E itself need not be Clone.
impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            observers: self.observers.clone(),
        }
    }
}
