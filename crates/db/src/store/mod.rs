//! The persistence gateway seen by the realtime layer.
//!
//! [`ChatStore`] is the one seam between in-memory coordination and durable
//! state. Direct conversations are resolved by exact pair everywhere; only
//! keys naming three or more participants fall back to superset matching.

use async_trait::async_trait;
use mingle_core::channel_key::ParticipantSet;
use mingle_core::error::CoreError;
use mingle_core::types::DbId;

use crate::models::conversation::{Conversation, ConversationDetail, CreateGroup};
use crate::models::message::{Message, NewMessage};

mod memory;
mod pg;

pub use memory::MemoryChatStore;
pub use pg::PgChatStore;

/// Errors surfaced by a [`ChatStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Domain rule violated before reaching storage.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        StoreError::Core(CoreError::NotFound { entity, id })
    }
}

/// Durable conversation and message storage.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Resolve the conversation for a participant set, creating it if absent.
    ///
    /// Two participants resolve by exact pair and create a direct
    /// conversation; larger sets resolve to the oldest conversation
    /// containing all of them and otherwise create a group.
    async fn find_or_create_conversation(
        &self,
        participants: &ParticipantSet,
    ) -> Result<Conversation, StoreError>;

    /// Exact-pair lookup of a direct conversation.
    async fn find_direct(
        &self,
        participants: &ParticipantSet,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Create a named group; the admin is always a participant.
    async fn create_group(&self, input: &CreateGroup) -> Result<Conversation, StoreError>;

    async fn get_conversation(&self, id: DbId) -> Result<ConversationDetail, StoreError>;

    /// Conversations of a user, most recently active first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError>;

    /// Persist a message and link it to its conversation atomically.
    async fn append_message(
        &self,
        conversation_id: DbId,
        message: &NewMessage,
    ) -> Result<Message, StoreError>;

    async fn list_messages(&self, conversation_id: DbId) -> Result<Vec<Message>, StoreError>;

    /// Mark messages from other participants as read; returns the count.
    async fn mark_read(&self, conversation_id: DbId, reader: &str) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Validate a group DTO and build its participant set (admin included).
pub(crate) fn group_participants(input: &CreateGroup) -> Result<ParticipantSet, StoreError> {
    mingle_core::messaging::validate_group_name(&input.name).map_err(CoreError::Validation)?;
    let ids = input
        .participants
        .iter()
        .cloned()
        .chain(std::iter::once(input.admin.clone()));
    Ok(ParticipantSet::new(ids)?)
}
