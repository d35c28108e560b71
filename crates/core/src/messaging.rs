//! Message and indicator validation rules.

use crate::channel_key::ParticipantSet;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a chat message in characters.
pub const MAX_MESSAGE_CONTENT_LENGTH: usize = 5_000;

/// Maximum length of a display name carried by typing indicators.
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Maximum length of a group conversation name.
pub const MAX_GROUP_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate message content: must be non-blank and within the length limit.
pub fn validate_message_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Message content must not be empty".to_string());
    }
    let len = content.chars().count();
    if len > MAX_MESSAGE_CONTENT_LENGTH {
        return Err(format!(
            "Message content exceeds maximum length of {MAX_MESSAGE_CONTENT_LENGTH} characters (got {len})"
        ));
    }
    Ok(())
}

/// Validate that the sender is one of the conversation participants.
pub fn validate_sender(sender: &str, participants: &ParticipantSet) -> Result<(), String> {
    if sender.trim().is_empty() {
        return Err("Message sender must not be empty".to_string());
    }
    if !participants.contains(sender) {
        return Err(format!(
            "Sender '{sender}' is not a participant of this conversation"
        ));
    }
    Ok(())
}

/// Validate the username shown in typing indicators.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username must not be empty".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username exceeds maximum length of {MAX_USERNAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a group name: non-blank and within the length limit.
pub fn validate_group_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Group name must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(format!(
            "Group name exceeds maximum length of {MAX_GROUP_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
