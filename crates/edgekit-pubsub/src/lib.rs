//! Channel-oriented message fan-out.
//!
//! The bus maps channel names to handlers. Publication is fire-and-forget
//! with at-most-once delivery: each matching handler is invoked once per
//! message, panics are isolated, and there is no retry. Pattern
//! subscriptions (`psubscribe`) support `*` wildcards.
//!
//! A subscriber must be [`close`](Subscriber::close)d to release its
//! long-lived registration; dropping it without closing leaks, and the leak
//! shows up in [`Bus::open_subscribers`]. A remote backend (Redis or
//! equivalent) can be attached behind the [`RemoteTransport`] seam; the
//! in-process fan-out is the reference transport.
//!
//! # Examples
//!
//! ```
//! use edgekit_pubsub::Bus;
//!
//! let bus = Bus::new();
//! let subscriber = bus.subscribe("orders.created", |channel, payload| {
//!     println!("{channel}: {} bytes", payload.len());
//! });
//!
//! bus.publish("orders.created", &b"{\"id\":7}"[..]);
//! subscriber.close();
//! ```

mod bus;
mod error;
mod pattern;
mod subscriber;

pub use bus::{Bus, RemoteTransport};
pub use error::PubSubError;
pub use subscriber::Subscriber;
