//! Well-known event type names.
//!
//! Every event in [`NOTIFICATION_EVENTS`] carries a persisted notification
//! object as payload and is pushed to its recipient as `new-notification`.

pub const POST_LIKED: &str = "post.liked";
pub const POST_COMMENTED: &str = "post.commented";
pub const FRIEND_REQUEST_SENT: &str = "friend_request.sent";
pub const FRIEND_REQUEST_ACCEPTED: &str = "friend_request.accepted";

/// Event types that produce a user-facing notification.
pub const NOTIFICATION_EVENTS: &[&str] = &[
    POST_LIKED,
    POST_COMMENTED,
    FRIEND_REQUEST_SENT,
    FRIEND_REQUEST_ACCEPTED,
];

/// Whether `event_type` should be delivered as a notification.
pub fn is_notification(event_type: &str) -> bool {
    NOTIFICATION_EVENTS.contains(&event_type)
}
