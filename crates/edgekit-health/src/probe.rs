//! Health probe endpoint table and response builders.

use crate::snapshot::{SystemSnapshot, TaskCounterSource};
use bytes::Bytes;
use http::{header, Method, Response, StatusCode};
use serde_json::json;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// The fixed set of paths answered by the probe.
pub const HEALTH_PATHS: &[&str] = &[
    "/health",
    "/health-check",
    "/healthcheck",
    "/healthz",
    "/readyz",
    "/livez",
    "/ping",
    "/status",
    "/health/live",
    "/health/ready",
    "/_health",
    "/_status",
];

// Response shape per path group.
enum Shape {
    Detailed,
    Token(&'static str),
    Status,
    LiveToken,
    ReadyToken,
    Internal,
}

fn shape_for(path: &str) -> Option<Shape> {
    match path {
        "/health" | "/health-check" | "/healthcheck" => Some(Shape::Detailed),
        "/healthz" => Some(Shape::Token("ok\n")),
        "/readyz" => Some(Shape::Token("ready\n")),
        "/livez" => Some(Shape::Token("alive\n")),
        "/ping" => Some(Shape::Token("pong\n")),
        "/status" => Some(Shape::Status),
        "/health/live" => Some(Shape::LiveToken),
        "/health/ready" => Some(Shape::ReadyToken),
        "/_health" | "/_status" => Some(Shape::Internal),
        _ => None,
    }
}

struct ProbeInner {
    service_name: String,
    started: Instant,
    snapshot: SystemSnapshot,
    task_counters: Option<TaskCounterSource>,
}

/// Fixed-path liveness/readiness responder.
///
/// The endpoint map is immutable after construction.
#[derive(Clone)]
pub struct HealthProbe {
    inner: Arc<ProbeInner>,
}

impl HealthProbe {
    /// Creates a probe for the named service, starting the uptime counter.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ProbeInner {
                service_name: service_name.into(),
                started: Instant::now(),
                snapshot: SystemSnapshot::new(),
                task_counters: None,
            }),
        }
    }

    /// Creates a probe that includes executor counters in the internal
    /// snapshot endpoints.
    pub fn with_task_counters(
        service_name: impl Into<String>,
        source: TaskCounterSource,
    ) -> Self {
        Self {
            inner: Arc::new(ProbeInner {
                service_name: service_name.into(),
                started: Instant::now(),
                snapshot: SystemSnapshot::new(),
                task_counters: Some(source),
            }),
        }
    }

    /// True when `path` is one of the probe endpoints.
    pub fn matches(&self, path: &str) -> bool {
        shape_for(path).is_some()
    }

    /// Builds the response for a probe path, or `None` for non-probe paths.
    ///
    /// HEAD produces an empty 200; GET produces the payload associated with
    /// the matched path. Either way the connection is closed after the
    /// write.
    pub fn respond(&self, method: &Method, path: &str) -> Option<Response<Bytes>> {
        let shape = shape_for(path)?;

        if method == Method::HEAD {
            return Some(finish(Response::builder(), "text/plain; charset=UTF-8", Bytes::new()));
        }

        let (content_type, body): (&str, Bytes) = match shape {
            Shape::Token(token) => ("text/plain; charset=UTF-8", Bytes::from_static(token.as_bytes())),
            Shape::Detailed => (
                "application/json; charset=UTF-8",
                json_body(json!({
                    "status": "UP",
                    "timestamp": unix_millis(),
                    "service": self.inner.service_name,
                    "uptime_seconds": self.inner.started.elapsed().as_secs(),
                    "liveness": "alive",
                    "readiness": "ready",
                })),
            ),
            Shape::Status => (
                "application/json; charset=UTF-8",
                json_body(json!({
                    "status": "UP",
                    "timestamp": unix_millis(),
                })),
            ),
            Shape::LiveToken => (
                "application/json; charset=UTF-8",
                json_body(json!({ "status": "alive" })),
            ),
            Shape::ReadyToken => (
                "application/json; charset=UTF-8",
                json_body(json!({ "status": "ready" })),
            ),
            Shape::Internal => {
                let (total, available) = self.inner.snapshot.memory();
                let tasks = self
                    .inner
                    .task_counters
                    .as_ref()
                    .map(|source| source())
                    .unwrap_or_default();
                (
                    "application/json; charset=UTF-8",
                    json_body(json!({
                        "service": self.inner.service_name,
                        "uptime_seconds": self.inner.started.elapsed().as_secs(),
                        "processors": self.inner.snapshot.processors(),
                        "memory": {
                            "total_bytes": total,
                            "available_bytes": available,
                        },
                        "tasks": {
                            "workers": tasks.workers,
                            "queued": tasks.queued,
                            "in_flight": tasks.in_flight,
                            "completed": tasks.completed,
                        },
                    })),
                )
            }
        };

        Some(finish(Response::builder(), content_type, body))
    }

    /// Service name reported in payloads.
    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }
}

fn json_body(value: serde_json::Value) -> Bytes {
    Bytes::from(value.to_string())
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn finish(builder: http::response::Builder, content_type: &str, body: Bytes) -> Response<Bytes> {
    let len = body.len();
    builder
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .header(header::CONNECTION, "close")
        .body(body)
        // Static header names and values cannot fail to assemble.
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}
