//! Request admission filtering.
//!
//! Every inbound request passes a strict stage order, and the first failing
//! stage short-circuits with its specific status:
//!
//! 1. Health probe paths are served directly.
//! 2. Decoder failures map to 413 (over-length), 400 (compression), 408
//!    (timeout), or 400 (anything else).
//! 3. Denied IP prefixes get 403.
//! 4. Unsound URIs (empty, `..`, `//`, denied extension, denied prefix)
//!    get 404.
//! 5. Bodies over the size cap get 413.
//! 6. Body-carrying methods with a content type outside the allow-list
//!    get 415.
//!
//! The filter places a [`RequestContext`](edgekit_core::RequestContext) on
//! the request before stage 1, so every later stage and the business
//! handler share one context snapshot. The [`FilterPolicy`] is published
//! atomically: readers take one load per request and updates swap the whole
//! snapshot.

mod config;
mod framing;
mod layer;
mod policy;
mod service;

pub use config::{AdmissionConfig, AdmissionConfigBuilder};
pub use framing::FramingError;
pub use layer::AdmissionLayer;
pub use policy::{FilterPolicy, PolicyHandle};
pub use service::Admission;

/// Default maximum body size: 10 MiB.
pub const HUGE_LIMIT: u64 = 10 * 1024 * 1024;
