//! Compiled attack pattern families.
//!
//! The list below is the authority on what matches. It is versioned so
//! operators can correlate rejections with the rule set that produced them;
//! any change to a family bumps [`PATTERN_VERSION`].

use regex::Regex;
use std::sync::LazyLock;

/// Version tag of the built-in pattern list.
pub const PATTERN_VERSION: &str = "2024.2";

/// Attack classification, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    /// SQL injection fragments.
    SqlInjection,
    /// Cross-site scripting vectors.
    CrossSiteScripting,
    /// Directory traversal sequences (scanned against the URI only).
    PathTraversal,
    /// Shell command injection fragments.
    CommandInjection,
}

impl AttackKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackKind::SqlInjection => "sql_injection",
            AttackKind::CrossSiteScripting => "xss",
            AttackKind::PathTraversal => "path_traversal",
            AttackKind::CommandInjection => "command_injection",
        }
    }
}

impl std::fmt::Display for AttackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// `(?:\s|\+|%20)` below tolerates interleaved whitespace, '+', and a
// percent-encoded space between tokens.

static SQL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\bunion(?:\s|\+|%20)+(?:all(?:\s|\+|%20)+)?select\b",
        r"(?i)\b(?:select|insert|update|delete|drop|truncate|alter)\b.+\b(?:from|into|table|set|where)\b",
        r"(?i)(?:'|%27)(?:\s|\+|%20)*(?:or|and)(?:\s|\+|%20)*(?:'|%27)?(?:\s|\+|%20)*\d",
        r"(?i)\b(?:or|and)(?:\s|\+|%20)+\d+(?:\s|\+|%20)*=(?:\s|\+|%20)*\d+",
        r"(?i)(?:'|\d)(?:\s|\+|%20)*(?:--|%2d%2d)",
        r"(?i)\b(?:exec|execute)\s+(?:xp_|sp_)\w+",
        r"(?i)\bsleep\s*\(\s*\d+\s*\)|\bbenchmark\s*\(",
    ])
});

static XSS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:<|%3c|&lt;?)(?:\s|\+|%20)*script",
        r"(?i)javascript(?:\s|\+|%20)*(?::|%3a)",
        r"(?i)\bon(?:load|error|click|mouseover|focus|blur)(?:\s|\+|%20)*=",
        r"(?i)(?:<|%3c)(?:\s|\+|%20)*(?:iframe|object|embed)\b",
        r"(?i)document\s*\.\s*cookie|window\s*\.\s*location|eval\s*\(",
        r"(?i)&#x?[0-9a-f]+;?\s*script",
    ])
});

static TRAVERSAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:\.\.|%2e%2e)(?:/|\\|%2f|%5c)",
        r"(?i)/(?:etc/(?:passwd|shadow)|windows/system32|boot\.ini)",
        r"(?i)%c0%ae|%c1%9c",
    ])
});

static COMMAND_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:;|\||&|%3b|%7c|%26)(?:\s|\+|%20)*(?:cat|ls|id|whoami|rm|wget|curl|nc|netcat|bash|sh|cmd(?:\.exe)?|powershell)\b",
        r"(?i)(?:`|%60).+(?:`|%60)",
        r"(?i)\$\([^)]*\)|%24%28",
        r"(?i)\b(?:ping|nslookup|traceroute)(?:\s|\+|%20)+(?:-\w+(?:\s|\+|%20)+)*\d{1,3}\.",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .unwrap_or_else(|error| panic!("built-in pattern {pattern:?} failed to compile: {error}"))
        })
        .collect()
}

/// The four compiled families, evaluated in a fixed order.
pub struct PatternSet {
    _private: (),
}

static GLOBAL: LazyLock<PatternSet> = LazyLock::new(|| PatternSet { _private: () });

impl PatternSet {
    /// Returns the process-wide compiled set.
    pub fn global() -> &'static PatternSet {
        &GLOBAL
    }

    /// Classifies a request, first match wins.
    ///
    /// `surface` is the concatenated request text (URI, body, header
    /// values); traversal patterns are evaluated against `uri` alone.
    pub fn classify(&self, surface: &str, uri: &str) -> Option<AttackKind> {
        if SQL_PATTERNS.iter().any(|p| p.is_match(surface)) {
            return Some(AttackKind::SqlInjection);
        }
        if XSS_PATTERNS.iter().any(|p| p.is_match(surface)) {
            return Some(AttackKind::CrossSiteScripting);
        }
        if TRAVERSAL_PATTERNS.iter().any(|p| p.is_match(uri)) {
            return Some(AttackKind::PathTraversal);
        }
        if COMMAND_PATTERNS.iter().any(|p| p.is_match(surface)) {
            return Some(AttackKind::CommandInjection);
        }
        None
    }
}
