//! Room naming.
//!
//! Personal rooms and conversation rooms live in separate namespaces so a
//! user id can never collide with a channel key.

use crate::channel_key::ChannelKey;

/// Prefix of rooms that address every connection of one user.
pub const PERSONAL_ROOM_PREFIX: &str = "user:";

/// Prefix of rooms that address every connection viewing a conversation.
pub const CONVERSATION_ROOM_PREFIX: &str = "conversation:";

/// Room that reaches all connections of `user_id`.
pub fn personal_room(user_id: &str) -> String {
    format!("{PERSONAL_ROOM_PREFIX}{user_id}")
}

/// Room that reaches all connections that joined the conversation `key`.
pub fn conversation_room(key: &ChannelKey) -> String {
    format!("{CONVERSATION_ROOM_PREFIX}{}", key.as_str())
}
