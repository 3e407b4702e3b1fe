//! Security filter service implementation.

use crate::config::SecurityConfig;
use crate::events::SecurityEvent;
use crate::ledger::AttackLedger;
use crate::patterns::PatternSet;
use bytes::Bytes;
use edgekit_core::PeerAddr;
use futures::future::BoxFuture;
use http::{header, Request, Response, StatusCode};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Service that scans requests for injection patterns and blocks
/// blacklisted IPs.
#[derive(Clone)]
pub struct Security<S> {
    inner: S,
    config: Arc<SecurityConfig>,
    ledger: Arc<AttackLedger>,
}

impl<S> Security<S> {
    pub(crate) fn new(inner: S, config: SecurityConfig, ledger: Arc<AttackLedger>) -> Self {
        Self {
            inner,
            config: Arc::new(config),
            ledger,
        }
    }
}

impl<S> Service<Request<Bytes>> for Security<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let ledger = Arc::clone(&self.ledger);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = request
                .extensions()
                .get::<PeerAddr>()
                .copied()
                .unwrap_or(PeerAddr(None))
                .display_key();
            // Deadlines are security-critical: always the exact clock.
            let now = config.clock.now_exact();

            if ledger.is_blacklisted(&ip, now) {
                tracing::warn!("Blocked request from blacklisted IP: {}", ip);
                config.event_listeners.emit(&SecurityEvent::Blocked {
                    filter_name: config.name.clone(),
                    timestamp: Instant::now(),
                    ip: ip.clone(),
                });

                #[cfg(feature = "metrics")]
                counter!("security_blacklisted_blocked_total", "filter" => config.name.clone())
                    .increment(1);

                return Ok(reject(&request));
            }

            let uri = request.uri().to_string();
            let surface = scan_surface(&request, &uri);

            // An error inside detection must never block legitimate traffic.
            let verdict = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                PatternSet::global().classify(&surface, &uri)
            }));

            let kind = match verdict {
                Ok(kind) => kind,
                Err(_) => {
                    tracing::warn!(
                        filter = %config.name,
                        remote_ip = %ip,
                        "attack detection failed internally; forwarding request"
                    );
                    None
                }
            };

            if let Some(kind) = kind {
                let attempts = ledger.record_attempt(&ip);
                tracing::warn!(
                    filter = %config.name,
                    remote_ip = %ip,
                    kind = %kind,
                    attempts,
                    "attack pattern detected"
                );
                config.event_listeners.emit(&SecurityEvent::AttackDetected {
                    filter_name: config.name.clone(),
                    timestamp: Instant::now(),
                    ip: ip.clone(),
                    kind,
                    attempts,
                });

                #[cfg(feature = "metrics")]
                counter!(
                    "security_attacks_detected_total",
                    "filter" => config.name.clone(),
                    "kind" => kind.as_str()
                )
                .increment(1);

                if attempts >= config.max_attempts_before_block {
                    let until_ms = now + config.blacklist_duration.as_millis() as u64;
                    ledger.blacklist(&ip, until_ms);
                    tracing::error!(
                        "IP blacklisted due to repeated attacks: {} (attempts: {})",
                        ip,
                        attempts
                    );
                    config.event_listeners.emit(&SecurityEvent::Blacklisted {
                        filter_name: config.name.clone(),
                        timestamp: Instant::now(),
                        ip: ip.clone(),
                        until_ms,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("security_ips_blacklisted_total", "filter" => config.name.clone())
                        .increment(1);
                }

                return Ok(reject(&request));
            }

            inner.call(request).await
        })
    }
}

// uri ++ " " ++ body ++ " " ++ header values, space separated.
fn scan_surface(request: &Request<Bytes>, uri: &str) -> String {
    let body = String::from_utf8_lossy(request.body());
    let mut surface = String::with_capacity(uri.len() + body.len() + 64);
    surface.push_str(uri);
    surface.push(' ');
    surface.push_str(&body);
    for value in request.headers().values() {
        if let Ok(value) = value.to_str() {
            surface.push(' ');
            surface.push_str(value);
        }
    }
    surface
}

fn reject(request: &Request<Bytes>) -> Response<Bytes> {
    let keep_alive = request
        .headers()
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("keep-alive"))
        .unwrap_or(false);

    Response::builder()
        .status(StatusCode::FORBIDDEN)
        .header(header::CONTENT_LENGTH, 0)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(
            header::CONNECTION,
            if keep_alive { "keep-alive" } else { "close" },
        )
        .body(Bytes::new())
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}
