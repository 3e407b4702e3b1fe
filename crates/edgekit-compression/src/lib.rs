//! Response compression with MIME and size bypass.
//!
//! The compressor negotiates gzip or deflate against the request's
//! `Accept-Encoding` and encodes the response body at default quality.
//! Encoding is skipped for small bodies (below a configurable threshold),
//! for media and pre-compressed content types, and when the client accepts
//! neither scheme.

mod config;
mod encoding;
mod layer;
mod service;

pub use config::{CompressionConfig, CompressionConfigBuilder};
pub use encoding::Encoding;
pub use layer::CompressionLayer;
pub use service::Compression;

/// Default minimum body size worth compressing: 2 KiB.
pub const DEFAULT_THRESHOLD: usize = 2 * 1024;
