//! Bus implementation.

use crate::error::PubSubError;
use crate::pattern::glob_match;
use crate::subscriber::Subscriber;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub(crate) type Handler = Arc<dyn Fn(&str, Bytes) + Send + Sync>;

/// Remote pub/sub backend (Redis or equivalent), attached behind a narrow
/// seam. Publications are forwarded after local fan-out; transport failures
/// are logged and never fail the publisher.
pub trait RemoteTransport: Send + Sync {
    /// Forwards one publication to the backend.
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PubSubError>;
}

pub(crate) enum Selector {
    Exact(String),
    Pattern(String),
}

impl Selector {
    fn matches(&self, channel: &str) -> bool {
        match self {
            Selector::Exact(name) => name == channel,
            Selector::Pattern(pattern) => glob_match(pattern, channel),
        }
    }
}

pub(crate) struct Subscription {
    selector: Selector,
    handler: Handler,
}

pub(crate) struct BusInner {
    subs: DashMap<u64, Subscription>,
    next_id: AtomicU64,
    open: AtomicUsize,
    transport: Option<Arc<dyn RemoteTransport>>,
}

impl BusInner {
    pub(crate) fn remove_subscription(&self, id: u64) {
        self.subs.remove(&id);
    }

    pub(crate) fn release(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-process channel fan-out with optional remote forwarding.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Creates a bus with in-process delivery only.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a bus that also forwards publications to a remote backend.
    pub fn with_transport(transport: Arc<dyn RemoteTransport>) -> Self {
        Self::build(Some(transport))
    }

    fn build(transport: Option<Arc<dyn RemoteTransport>>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subs: DashMap::new(),
                next_id: AtomicU64::new(1),
                open: AtomicUsize::new(0),
                transport,
            }),
        }
    }

    /// Publishes `payload` to every handler matching `channel`.
    ///
    /// Fire-and-forget, at-most-once: handlers run on the async runtime when
    /// one is available (inline otherwise), a panicking handler is isolated,
    /// and nothing is retried.
    pub fn publish(&self, channel: &str, payload: impl Into<Bytes>) {
        let payload = payload.into();

        for entry in self.inner.subs.iter() {
            if !entry.value().selector.matches(channel) {
                continue;
            }
            let handler = Arc::clone(&entry.value().handler);
            let channel = channel.to_string();
            let payload = payload.clone();
            deliver(handler, channel, payload);
        }

        if let Some(transport) = &self.inner.transport {
            if let Err(error) = transport.publish(channel, &payload) {
                tracing::warn!(%channel, %error, "remote publish failed");
            }
        }
    }

    /// Subscribes a handler to one exact channel.
    pub fn subscribe<F>(&self, channel: impl Into<String>, handler: F) -> Subscriber
    where
        F: Fn(&str, Bytes) + Send + Sync + 'static,
    {
        self.add(Selector::Exact(channel.into()), Arc::new(handler))
    }

    /// Subscribes a handler to every channel matching a `*` pattern.
    pub fn psubscribe<F>(&self, pattern: impl Into<String>, handler: F) -> Subscriber
    where
        F: Fn(&str, Bytes) + Send + Sync + 'static,
    {
        self.add(Selector::Pattern(pattern.into()), Arc::new(handler))
    }

    fn add(&self, selector: Selector, handler: Handler) -> Subscriber {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.subs.insert(id, Subscription { selector, handler });
        self.inner.open.fetch_add(1, Ordering::SeqCst);
        Subscriber::new(id, Arc::clone(&self.inner))
    }

    /// Diagnostic: subscribers created and not yet closed.
    ///
    /// A stable non-zero value after teardown points at leaked subscribers.
    pub fn open_subscribers(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Number of registrations currently receiving messages.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.subs.len()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(handler: Handler, channel: String, payload: Bytes) {
    let run = move || {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handler(&channel, payload);
        }));
        if result.is_err() {
            tracing::warn!(%channel, "subscriber handler panicked");
        }
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { run() });
        }
        Err(_) => run(),
    }
}
