//! Injection pattern detection with adaptive IP blacklisting.
//!
//! Each request is scanned against four compiled pattern families (SQL
//! injection, cross-site scripting, path traversal (URI only), and command
//! injection) over a scan surface of `uri ++ " " ++ body ++ " " ++ header
//! values`. A match rejects the request with 403 and counts against the
//! remote IP; crossing the attempt threshold blacklists the IP for the
//! configured duration. Expired blacklist entries are wiped together with
//! the attempt counter, so benign clients get a clean slate.
//!
//! The pattern list is fixed and versioned (see
//! [`PATTERN_VERSION`](patterns::PATTERN_VERSION)); matching is
//! case-insensitive and tolerates interleaved whitespace and common
//! percent-/HTML-encodings.

mod config;
mod events;
mod layer;
mod ledger;
pub mod patterns;
mod service;

pub use config::{SecurityConfig, SecurityConfigBuilder};
pub use events::SecurityEvent;
pub use layer::SecurityLayer;
pub use ledger::AttackLedger;
pub use patterns::{AttackKind, PatternSet};
pub use service::Security;
