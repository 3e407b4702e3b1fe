//! Edge-serving and scheduling runtime.
//!
//! `edgekit` turns an HTTP endpoint into a safe, observable, reliably
//! scheduled service. Three pillars cooperate:
//!
//! - **Edge request pipeline**: a staged tower middleware chain of per-IP
//!   connection limiting ([`gate`]), request admission ([`admission`]),
//!   injection detection with adaptive blacklisting ([`security`]), and
//!   negotiated response compression ([`compression`]). Health endpoints
//!   ([`health`]) are answered ahead of every stage.
//! - **Timeout cache** ([`cache`]): a write-buffered, time-expiring map
//!   with lazy eviction and a cached coarse clock, so hot reads never pay a
//!   time syscall.
//! - **Task scheduler** ([`scheduler`]): descriptor-driven periodic jobs
//!   with day-of-week filtering, date windows, and calendar-month anchors,
//!   running on the shared bounded executor ([`executor`]).
//!
//! Each pillar is its own crate and feature; this meta-crate re-exports the
//! enabled ones, carries the serde [`EdgeConfig`] surface, and (with the
//! `runtime` feature) wires everything together behind [`EdgeRuntime`] with
//! ordered shutdown.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! edgekit = { version = "0.1", features = ["gate", "admission", "security"] }
//! ```
//!
//! Request flow through a composed stack:
//!
//! ```text
//! inbound ── gate ── admission ── security ── business ── compression ── wire
//!              │          │            │
//!              │          │            └─ per-IP attempt counters, blacklist
//!              │          └─ health fast path, framing, URI, size, media type
//!              └─ per-IP live connection counters
//! ```
//!
//! # Composition
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "gate", feature = "admission", feature = "security", feature = "compression"))]
//! # mod example {
//! use bytes::Bytes;
//! use edgekit::admission::AdmissionLayer;
//! use edgekit::compression::CompressionLayer;
//! use edgekit::gate::GateLayer;
//! use edgekit::security::SecurityLayer;
//! use tower::ServiceBuilder;
//!
//! fn stack() {
//!     let pipeline = ServiceBuilder::new()
//!         .layer(GateLayer::builder().max_per_ip(100).build())
//!         .layer(AdmissionLayer::builder().build())
//!         .layer(SecurityLayer::builder().build())
//!         .layer(CompressionLayer::builder().build())
//!         .service_fn(|_request: http::Request<Bytes>| async {
//!             Ok::<_, edgekit::gate::GateError>(http::Response::new(Bytes::new()))
//!         });
//!     let _ = pipeline;
//! }
//! # }
//! ```

pub use edgekit_core::{CoarseClock, PeerAddr, RequestContext};

#[cfg(feature = "admission")]
pub use edgekit_admission as admission;

#[cfg(feature = "cache")]
pub use edgekit_cache as cache;

#[cfg(feature = "compression")]
pub use edgekit_compression as compression;

#[cfg(feature = "executor")]
pub use edgekit_executor as executor;

#[cfg(feature = "gate")]
pub use edgekit_gate as gate;

#[cfg(feature = "health")]
pub use edgekit_health as health;

#[cfg(feature = "pubsub")]
pub use edgekit_pubsub as pubsub;

#[cfg(feature = "scheduler")]
pub use edgekit_scheduler as scheduler;

#[cfg(feature = "security")]
pub use edgekit_security as security;

mod boundary;
mod config;
mod headers;
#[cfg(feature = "runtime")]
mod runtime;

pub use boundary::{ErrorBoundary, ErrorBoundaryLayer};
pub use config::EdgeConfig;
pub use headers::StandardHeadersLayer;
#[cfg(feature = "runtime")]
pub use runtime::EdgeRuntime;
