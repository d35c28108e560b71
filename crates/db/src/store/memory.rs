use async_trait::async_trait;
use chrono::Utc;
use mingle_core::channel_key::ParticipantSet;
use mingle_core::types::DbId;
use tokio::sync::Mutex;

use super::{group_participants, ChatStore, StoreError};
use crate::models::conversation::{Conversation, ConversationDetail, CreateGroup};
use crate::models::message::{Message, NewMessage};

#[derive(Default)]
struct Tables {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    next_conversation_id: DbId,
    next_message_id: DbId,
}

impl Tables {
    fn insert_conversation(
        &mut self,
        participants: &ParticipantSet,
        group: Option<(&str, &str)>,
    ) -> Conversation {
        self.next_conversation_id += 1;
        let now = Utc::now();
        let conversation = Conversation {
            id: self.next_conversation_id,
            participants: participants.as_slice().to_vec(),
            direct_key: if group.is_some() {
                None
            } else {
                participants.direct_key()
            },
            is_group: group.is_some() || !participants.is_direct(),
            group_name: group.map(|(name, _)| name.to_string()),
            group_admin: group.map(|(_, admin)| admin.to_string()),
            last_message_id: None,
            created_at: now,
            updated_at: now,
        };
        self.conversations.push(conversation.clone());
        conversation
    }

    fn find_direct(&self, key: &str) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|c| !c.is_group && c.direct_key.as_deref() == Some(key))
    }
}

/// In-process [`ChatStore`].
///
/// Every operation runs under a single lock, so find-or-create and
/// append-then-link are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryChatStore {
    tables: Mutex<Tables>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn conversation_count(&self) -> usize {
        self.tables.lock().await.conversations.len()
    }

    pub async fn message_count(&self) -> usize {
        self.tables.lock().await.messages.len()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn find_or_create_conversation(
        &self,
        participants: &ParticipantSet,
    ) -> Result<Conversation, StoreError> {
        let mut tables = self.tables.lock().await;

        let existing = match participants.direct_key() {
            Some(key) => tables.find_direct(&key).cloned(),
            None => tables
                .conversations
                .iter()
                .find(|c| participants.is_subset_of(&c.participants))
                .cloned(),
        };

        Ok(match existing {
            Some(conversation) => conversation,
            None => tables.insert_conversation(participants, None),
        })
    }

    async fn find_direct(
        &self,
        participants: &ParticipantSet,
    ) -> Result<Option<Conversation>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(participants
            .direct_key()
            .and_then(|key| tables.find_direct(&key).cloned()))
    }

    async fn create_group(&self, input: &CreateGroup) -> Result<Conversation, StoreError> {
        let participants = group_participants(input)?;
        let mut tables = self.tables.lock().await;
        Ok(tables.insert_conversation(&participants, Some((input.name.trim(), &input.admin))))
    }

    async fn get_conversation(&self, id: DbId) -> Result<ConversationDetail, StoreError> {
        let tables = self.tables.lock().await;
        let conversation = tables
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Conversation", id))?;
        let message_ids = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == id)
            .map(|m| m.id)
            .collect();
        Ok(ConversationDetail {
            conversation,
            message_ids,
        })
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let tables = self.tables.lock().await;
        let mut found: Vec<Conversation> = tables
            .conversations
            .iter()
            .filter(|c| c.participants.iter().any(|p| p == user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn append_message(
        &self,
        conversation_id: DbId,
        message: &NewMessage,
    ) -> Result<Message, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.next_message_id += 1;
        let id = tables.next_message_id;
        let now = Utc::now();

        let conversation = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| StoreError::not_found("Conversation", conversation_id))?;
        conversation.last_message_id = Some(id);
        conversation.updated_at = now;

        let stored = Message {
            id,
            conversation_id,
            sender: message.sender.clone(),
            content: message.content.clone(),
            is_read: false,
            created_at: now,
        };
        tables.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, conversation_id: DbId) -> Result<Vec<Message>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, conversation_id: DbId, reader: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let mut changed = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id && m.sender != reader && !m.is_read)
        {
            message.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
