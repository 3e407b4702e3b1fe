//! The recognized configuration surface.
//!
//! `EdgeConfig` is a plain serde shape; the embedding application decides
//! where it is loaded from (TOML, JSON, environment). Every option feeds
//! the corresponding pillar builder.

use serde::{Deserialize, Serialize};

/// Recognized options, with their external (camel-cased / dotted) names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Gate limit per remote IP.
    #[serde(rename = "maxConnectionsPerIp")]
    pub max_connections_per_ip: usize,
    /// Detections before an IP is blacklisted.
    #[serde(rename = "maxAttemptsBeforeBlock")]
    pub max_attempts_before_block: u32,
    /// Blacklist TTL in seconds.
    #[serde(rename = "blacklistDurationSeconds")]
    pub blacklist_duration_seconds: u64,
    /// Denied prefixes.
    pub deny: DenySection,
    /// Allow-lists.
    pub allowed: AllowedSection,
    /// Body size cap.
    pub huge: HugeSection,
    /// Compressor options.
    pub compression: CompressionSection,
    /// Cache instance options.
    pub cache: CacheSection,
    /// Scheduler options.
    pub task: TaskSection,
}

/// `deny.*` options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DenySection {
    /// Remote-IP prefixes rejected with 403.
    pub ips: Vec<String>,
    /// URI prefixes rejected with 404.
    pub urls: Vec<String>,
    /// URI extensions rejected with 404 (lowercased exact match).
    pub extensions: Vec<String>,
}

/// `allowed.*` options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedSection {
    /// Substrings a body-carrying `Content-Type` must contain one of.
    #[serde(rename = "contentTypes")]
    pub content_types: Vec<String>,
}

/// `huge.*` options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HugeSection {
    /// Maximum body bytes.
    pub limit: u64,
}

/// `compression.*` options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSection {
    /// Minimum body size worth compressing.
    pub threshold: usize,
    /// Content types never compressed.
    #[serde(rename = "excludedMimeTypes")]
    pub excluded_mime_types: Vec<String>,
}

/// `cache.*` options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Entry time-to-live in minutes.
    #[serde(rename = "expireMinutes")]
    pub expire_minutes: u64,
    /// Maximum entries per cache instance.
    #[serde(rename = "maxSize")]
    pub max_size: usize,
}

/// `task.*` options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSection {
    /// IANA zone fire times are computed in.
    pub timezone: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_ip: 100,
            max_attempts_before_block: 5,
            blacklist_duration_seconds: 600,
            deny: DenySection::default(),
            allowed: AllowedSection::default(),
            huge: HugeSection::default(),
            compression: CompressionSection::default(),
            cache: CacheSection::default(),
            task: TaskSection::default(),
        }
    }
}

impl Default for AllowedSection {
    fn default() -> Self {
        Self {
            content_types: vec![
                "application/json".to_string(),
                "application/xml".to_string(),
                "text/".to_string(),
                "application/x-www-form-urlencoded".to_string(),
                "multipart/form-data".to_string(),
            ],
        }
    }
}

impl Default for HugeSection {
    fn default() -> Self {
        Self {
            limit: 10 * 1024 * 1024,
        }
    }
}

impl Default for CompressionSection {
    fn default() -> Self {
        Self {
            threshold: 2 * 1024,
            excluded_mime_types: Vec::new(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            expire_minutes: 10,
            max_size: 10_000_000,
        }
    }
}

impl Default for TaskSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Seoul".to_string(),
        }
    }
}

#[cfg(feature = "admission")]
impl EdgeConfig {
    /// The admission rule set this configuration describes.
    pub fn filter_policy(&self) -> edgekit_admission::FilterPolicy {
        let defaults = edgekit_admission::FilterPolicy::default();
        edgekit_admission::FilterPolicy {
            denied_ip_prefixes: self.deny.ips.clone(),
            denied_uri_prefixes: if self.deny.urls.is_empty() {
                defaults.denied_uri_prefixes
            } else {
                self.deny.urls.clone()
            },
            denied_extensions: if self.deny.extensions.is_empty() {
                defaults.denied_extensions
            } else {
                self.deny
                    .extensions
                    .iter()
                    .map(|e| e.to_ascii_lowercase())
                    .collect()
            },
            allowed_content_types: self.allowed.content_types.clone(),
            max_body_bytes: self.huge.limit,
        }
    }
}
