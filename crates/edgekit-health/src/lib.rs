//! Multi-endpoint liveness/readiness surface.
//!
//! A fixed, hard-coded set of health paths is answered directly by the edge
//! pipeline, ahead of every other filter stage. Response shape depends on
//! the path group: detailed JSON, Kubernetes-style plain-text tokens,
//! lightweight status JSON, or an internal system snapshot. All responses
//! carry `Cache-Control: no-cache, no-store, must-revalidate` and close the
//! connection after the write.
//!
//! # Examples
//!
//! ```
//! use edgekit_health::HealthProbe;
//! use http::Method;
//!
//! let probe = HealthProbe::new("edge");
//! let response = probe.respond(&Method::GET, "/healthz").unwrap();
//! assert_eq!(response.body().as_ref(), b"ok\n");
//! ```

mod probe;
mod snapshot;

pub use probe::{HealthProbe, HEALTH_PATHS};
pub use snapshot::{TaskCounters, TaskCounterSource};
