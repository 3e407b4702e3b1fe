//! Tower layer implementation for the compressor.

use crate::config::CompressionConfig;
use crate::service::Compression;
use tower::Layer;

/// Layer that applies negotiated response compression.
#[derive(Clone)]
pub struct CompressionLayer {
    config: CompressionConfig,
}

impl CompressionLayer {
    /// Creates a new compression layer with the given configuration.
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    /// Creates a new builder for configuring a compression layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use edgekit_compression::CompressionLayer;
    ///
    /// let layer = CompressionLayer::builder()
    ///     .threshold(4 * 1024)
    ///     .build();
    /// ```
    pub fn builder() -> crate::CompressionConfigBuilder {
        crate::CompressionConfigBuilder::new()
    }

    /// Preset: defaults tuned for JSON/HTML API traffic.
    pub fn web_defaults() -> crate::CompressionConfigBuilder {
        Self::builder()
    }
}

impl<S> Layer<S> for CompressionLayer {
    type Service = Compression<S>;

    fn layer(&self, service: S) -> Self::Service {
        Compression::new(service, self.config.clone())
    }
}
