//! Reloadable filter policy.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The admission rule set.
///
/// Prefix lists match from the start of the value; extensions match the end
/// of the URI path (lowercased); content types match as substrings of the
/// `Content-Type` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPolicy {
    /// Remote IPs starting with any of these are rejected with 403.
    pub denied_ip_prefixes: Vec<String>,
    /// URI paths starting with any of these are rejected with 404.
    pub denied_uri_prefixes: Vec<String>,
    /// URI paths ending with any of these (lowercased) are rejected with 404.
    pub denied_extensions: Vec<String>,
    /// A body-carrying request's `Content-Type` must contain one of these.
    pub allowed_content_types: Vec<String>,
    /// Requests with more body bytes than this are rejected with 413.
    pub max_body_bytes: u64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            denied_ip_prefixes: Vec::new(),
            denied_uri_prefixes: vec![
                "/admin".to_string(),
                "/.git".to_string(),
                "/.env".to_string(),
                "/wp-admin".to_string(),
                "/phpmyadmin".to_string(),
            ],
            denied_extensions: vec![
                ".php".to_string(),
                ".asp".to_string(),
                ".aspx".to_string(),
                ".jsp".to_string(),
                ".cgi".to_string(),
                ".exe".to_string(),
                ".dll".to_string(),
                ".sh".to_string(),
                ".bat".to_string(),
            ],
            allowed_content_types: vec![
                "application/json".to_string(),
                "application/xml".to_string(),
                "text/".to_string(),
                "application/x-www-form-urlencoded".to_string(),
                "multipart/form-data".to_string(),
            ],
            max_body_bytes: crate::HUGE_LIMIT,
        }
    }
}

/// Atomically published policy snapshot.
///
/// Readers see a consistent policy for the whole request; `store` replaces
/// the snapshot for subsequent loads without blocking readers.
#[derive(Clone)]
pub struct PolicyHandle {
    inner: Arc<ArcSwap<FilterPolicy>>,
}

impl PolicyHandle {
    /// Publishes an initial policy.
    pub fn new(policy: FilterPolicy) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(policy)),
        }
    }

    /// Takes one atomic snapshot of the current policy.
    pub fn load(&self) -> Arc<FilterPolicy> {
        self.inner.load_full()
    }

    /// Replaces the whole policy for subsequent loads.
    pub fn store(&self, policy: FilterPolicy) {
        self.inner.store(Arc::new(policy));
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(FilterPolicy::default())
    }
}
