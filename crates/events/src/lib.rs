//! Mingle in-process event bus.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope published by the post and
//!   friend-request handlers and consumed by the realtime notification router.

pub mod bus;
pub mod event_types;

pub use bus::{EventBus, PlatformEvent};
