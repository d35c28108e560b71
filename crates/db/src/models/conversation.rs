//! Conversation entity models and DTOs.

use mingle_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `conversations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    /// Sorted, unique participant ids.
    pub participants: Vec<UserId>,
    /// Length-prefixed canonical pair key (`5:alice3:bob`); `None` for groups.
    pub direct_key: Option<String>,
    pub is_group: bool,
    pub group_name: Option<String>,
    pub group_admin: Option<UserId>,
    pub last_message_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A conversation together with its ordered message ids.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    /// Message ids in creation order.
    pub message_ids: Vec<DbId>,
}

/// DTO for creating a group conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    /// Creator of the group; always added to the participants.
    pub admin: UserId,
    pub participants: Vec<UserId>,
}
