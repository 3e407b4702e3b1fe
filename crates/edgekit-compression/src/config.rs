//! Configuration for the compressor.

use crate::DEFAULT_THRESHOLD;

/// Configuration for the compressor.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Bodies smaller than this are left alone.
    pub(crate) threshold: usize,
    /// Content types never compressed (exact match after normalization).
    pub(crate) excluded_mime_types: Vec<String>,
    /// Name of this compressor instance.
    pub(crate) name: String,
}

impl CompressionConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CompressionConfigBuilder {
        CompressionConfigBuilder::new()
    }
}

fn default_exclusions() -> Vec<String> {
    [
        "application/zip",
        "application/gzip",
        "application/x-gzip",
        "application/x-rar-compressed",
        "application/x-7z-compressed",
        "application/pdf",
        "application/octet-stream",
        "font/woff",
        "font/woff2",
        "application/vnd.ms-fontobject",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Builder for compression configuration.
pub struct CompressionConfigBuilder {
    threshold: usize,
    excluded_mime_types: Vec<String>,
    name: String,
}

impl CompressionConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            excluded_mime_types: default_exclusions(),
            name: "compression".to_string(),
        }
    }

    /// Sets the minimum body size worth compressing.
    ///
    /// Default: 2 KiB
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replaces the excluded content-type set.
    ///
    /// `image/`, `audio/`, and `video/` prefixes are always skipped,
    /// independent of this set.
    pub fn excluded_mime_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.excluded_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the name of this compressor instance.
    ///
    /// Default: "compression"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the configuration and returns a
    /// [`CompressionLayer`](crate::CompressionLayer).
    pub fn build(self) -> crate::layer::CompressionLayer {
        let config = CompressionConfig {
            threshold: self.threshold,
            excluded_mime_types: self
                .excluded_mime_types
                .into_iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
            name: self.name,
        };
        crate::layer::CompressionLayer::new(config)
    }
}

impl Default for CompressionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
