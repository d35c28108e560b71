use async_trait::async_trait;
use mingle_core::channel_key::ParticipantSet;
use mingle_core::types::DbId;

use super::{group_participants, ChatStore, StoreError};
use crate::models::conversation::{Conversation, ConversationDetail, CreateGroup};
use crate::models::message::{Message, NewMessage};
use crate::repositories::{ConversationRepo, MessageRepo};
use crate::DbPool;

/// [`ChatStore`] backed by Postgres through the repositories.
#[derive(Clone)]
pub struct PgChatStore {
    pool: DbPool,
}

impl PgChatStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_or_create_conversation(
        &self,
        participants: &ParticipantSet,
    ) -> Result<Conversation, StoreError> {
        if let Some(direct_key) = participants.direct_key() {
            let conversation = ConversationRepo::find_or_create_direct(
                &self.pool,
                participants.as_slice(),
                &direct_key,
            )
            .await?;
            return Ok(conversation);
        }

        if let Some(existing) =
            ConversationRepo::find_containing(&self.pool, participants.as_slice()).await?
        {
            return Ok(existing);
        }

        let created =
            ConversationRepo::create_group(&self.pool, participants.as_slice(), None, None).await?;
        tracing::info!(
            conversation_id = created.id,
            participants = participants.len(),
            "Created group conversation from channel key"
        );
        Ok(created)
    }

    async fn find_direct(
        &self,
        participants: &ParticipantSet,
    ) -> Result<Option<Conversation>, StoreError> {
        match participants.direct_key() {
            Some(key) => Ok(ConversationRepo::find_direct(&self.pool, &key).await?),
            None => Ok(None),
        }
    }

    async fn create_group(&self, input: &CreateGroup) -> Result<Conversation, StoreError> {
        let participants = group_participants(input)?;
        let conversation = ConversationRepo::create_group(
            &self.pool,
            participants.as_slice(),
            Some(input.name.trim()),
            Some(&input.admin),
        )
        .await?;
        Ok(conversation)
    }

    async fn get_conversation(&self, id: DbId) -> Result<ConversationDetail, StoreError> {
        let conversation = ConversationRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Conversation", id))?;
        let message_ids = ConversationRepo::message_ids(&self.pool, id).await?;
        Ok(ConversationDetail {
            conversation,
            message_ids,
        })
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        Ok(ConversationRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn append_message(
        &self,
        conversation_id: DbId,
        message: &NewMessage,
    ) -> Result<Message, StoreError> {
        match MessageRepo::append(&self.pool, conversation_id, message).await {
            Err(sqlx::Error::RowNotFound) => {
                Err(StoreError::not_found("Conversation", conversation_id))
            }
            other => Ok(other?),
        }
    }

    async fn list_messages(&self, conversation_id: DbId) -> Result<Vec<Message>, StoreError> {
        Ok(MessageRepo::list_for_conversation(&self.pool, conversation_id).await?)
    }

    async fn mark_read(&self, conversation_id: DbId, reader: &str) -> Result<u64, StoreError> {
        Ok(MessageRepo::mark_read(&self.pool, conversation_id, reader).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
