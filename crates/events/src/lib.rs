//! Bingoals event bus and notification fan-out.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope, optionally carrying a
//!   [`Notice`] for board members.
//! - [`NotificationFanout`] -- background task that turns notices into
//!   per-member notification rows and hands them to a [`NotificationSink`].

pub mod bus;
pub mod fanout;
pub mod notify;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use fanout::NotificationFanout;
pub use notify::{Notice, NotificationSink, SinkError, TracingSink};
