//! Message entity models and DTOs.

use mingle_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub conversation_id: DbId,
    pub sender: UserId,
    pub content: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for appending a message to a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub sender: UserId,
    pub content: String,
}
