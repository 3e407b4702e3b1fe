//! Connection gate core.

use crate::config::GateConfig;
use crate::error::GateError;
use crate::events::GateEvent;
use dashmap::DashMap;
use edgekit_core::PeerAddr;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

pub(crate) struct GateInner {
    counts: DashMap<String, usize>,
    config: GateConfig,
}

/// Per-remote-IP live connection counter.
///
/// Transports that own raw sockets call [`try_acquire`](Self::try_acquire)
/// at accept time; the tower [`Gate`](crate::Gate) service uses the same
/// counters at request granularity. Counters are removed the moment they
/// reach zero.
#[derive(Clone)]
pub struct ConnectionGate {
    inner: Arc<GateInner>,
}

impl ConnectionGate {
    pub(crate) fn new(config: GateConfig) -> Self {
        Self {
            inner: Arc::new(GateInner {
                counts: DashMap::new(),
                config,
            }),
        }
    }

    /// Counts the peer in, or rejects it when over the limit.
    ///
    /// A rejected accept rolls its increment back immediately, so the
    /// external observer never sees more than `max_per_ip` live connections
    /// beyond the instant of the concurrent accept itself.
    pub fn try_acquire(&self, peer: PeerAddr) -> Result<ConnectionPermit, GateError> {
        let key = peer.display_key();
        let current = {
            let mut entry = self.inner.counts.entry(key.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        if current > self.inner.config.max_per_ip {
            release(&self.inner, &key);
            tracing::warn!("Connection limit exceeded for IP: {} (current: {})", key, current);
            self.inner.config.event_listeners.emit(&GateEvent::ConnectionRejected {
                gate_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                ip: key.clone(),
                current,
            });

            #[cfg(feature = "metrics")]
            counter!("gate_connections_rejected_total", "gate" => self.inner.config.name.clone())
                .increment(1);

            return Err(GateError::LimitExceeded { ip: key, current });
        }

        tracing::info!("Connection accepted from IP: {} (total: {})", key, current);
        self.inner.config.event_listeners.emit(&GateEvent::ConnectionAccepted {
            gate_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
            ip: key.clone(),
            total: current,
        });

        #[cfg(feature = "metrics")]
        counter!("gate_connections_accepted_total", "gate" => self.inner.config.name.clone())
            .increment(1);

        Ok(ConnectionPermit {
            inner: Arc::clone(&self.inner),
            key,
        })
    }

    /// Live connections currently counted for `ip`.
    pub fn active(&self, ip: &str) -> usize {
        self.inner.counts.get(ip).map(|entry| *entry).unwrap_or(0)
    }

    /// Number of distinct IPs with live connections.
    pub fn tracked_ips(&self) -> usize {
        self.inner.counts.len()
    }

    /// Name of this gate instance.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }
}

// Decrement and drop the record atomically when it reaches zero.
fn release(inner: &GateInner, key: &str) {
    if let dashmap::mapref::entry::Entry::Occupied(mut occupied) = inner.counts.entry(key.to_string()) {
        let count = occupied.get_mut();
        *count = count.saturating_sub(1);
        if *count == 0 {
            occupied.remove();
        }
    }
}

/// RAII permit for one counted connection.
///
/// Dropping the permit releases the slot; the counter record disappears when
/// its count returns to zero.
pub struct ConnectionPermit {
    inner: Arc<GateInner>,
    key: String,
}

impl ConnectionPermit {
    /// Remote IP this permit is counted under.
    pub fn ip(&self) -> &str {
        &self.key
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        release(&self.inner, &self.key);
        self.inner.config.event_listeners.emit(&GateEvent::ConnectionReleased {
            gate_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
            ip: self.key.clone(),
        });
    }
}
