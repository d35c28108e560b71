//! Notification push.
//!
//! The [`NotificationRouter`] subscribes to the event bus and forwards each
//! notification event to its recipient's personal room.

pub mod router;

pub use router::NotificationRouter;
