//! Per-remote-IP concurrent connection limiting.
//!
//! The gate tracks one live-connection counter per remote IP. An accept
//! increments the counter; crossing the configured limit rolls the increment
//! back and rejects the connection through the error channel, so the
//! transport can close the socket without writing a response. Release is
//! RAII: dropping the [`ConnectionPermit`] decrements the counter and
//! removes it when it reaches zero.
//!
//! Peers without a resolvable address share one "unknown" bucket with the
//! same limit, so anonymous connections are never unlimited.
//!
//! # Examples
//!
//! ```
//! use edgekit_gate::GateConfig;
//!
//! let layer = GateConfig::builder()
//!     .max_per_ip(3)
//!     .name("edge-gate")
//!     .on_rejected(|ip, current| {
//!         eprintln!("{ip} over limit at {current}");
//!     })
//!     .build();
//! ```

mod config;
mod error;
mod events;
mod gate;
mod layer;
mod service;

pub use config::{GateConfig, GateConfigBuilder};
pub use error::GateError;
pub use events::GateEvent;
pub use gate::{ConnectionGate, ConnectionPermit};
pub use layer::GateLayer;
pub use service::Gate;
