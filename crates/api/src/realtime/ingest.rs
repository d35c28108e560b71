//! Message ingestion for `send-message`.
//!
//! Validates the payload, resolves the backing conversation (creating it on
//! first contact), and persists the message through the [`ChatStore`].

use std::collections::HashMap;
use std::sync::Arc;

use mingle_core::channel_key::{ChannelKey, ParticipantSet};
use mingle_core::error::CoreError;
use mingle_core::messaging::{validate_message_content, validate_sender};
use mingle_db::models::conversation::Conversation;
use mingle_db::models::message::{Message, NewMessage};
use mingle_db::store::ChatStore;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::realtime::error::GatewayError;
use crate::realtime::protocol::ChatMessage;

/// Number of idle lock slots tolerated before a sweep.
const LOCK_SWEEP_THRESHOLD: usize = 1024;

// ---------------------------------------------------------------------------
// KeyedLocks
// ---------------------------------------------------------------------------

/// One async mutex per key, created on demand.
///
/// Serializes conversation creation per participant set in-process, on top
/// of the unique constraint the store enforces for direct pairs.
#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            if slots.len() >= LOCK_SWEEP_THRESHOLD {
                // Only the map holds a reference: nobody owns or awaits it.
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        slot.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

// ---------------------------------------------------------------------------
// MessageIngestor
// ---------------------------------------------------------------------------

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub conversation: Conversation,
    pub message: Message,
}

pub struct MessageIngestor {
    store: Arc<dyn ChatStore>,
    creation_locks: KeyedLocks,
}

impl MessageIngestor {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            store,
            creation_locks: KeyedLocks::new(),
        }
    }

    /// Persist `message` into the conversation addressed by `key`.
    ///
    /// 1. Parse the participants out of the key.
    /// 2. Validate sender membership and content.
    /// 3. Find or create the conversation under the per-set lock.
    /// 4. Append the message; the store links it atomically.
    pub async fn ingest(
        &self,
        key: &ChannelKey,
        message: &ChatMessage,
    ) -> Result<Ingested, GatewayError> {
        let participants = key.participants()?;
        validate_sender(&message.sender, &participants).map_err(CoreError::Validation)?;
        validate_message_content(&message.content).map_err(CoreError::Validation)?;

        let conversation = self.resolve(&participants).await?;

        let stored = self
            .store
            .append_message(
                conversation.id,
                &NewMessage {
                    sender: message.sender.clone(),
                    content: message.content.clone(),
                },
            )
            .await?;

        tracing::debug!(
            conversation_id = conversation.id,
            message_id = stored.id,
            sender = %stored.sender,
            "Message persisted"
        );

        Ok(Ingested {
            conversation,
            message: stored,
        })
    }

    async fn resolve(&self, participants: &ParticipantSet) -> Result<Conversation, GatewayError> {
        let lock_key = participants.canonical_key();
        let _guard = self.creation_locks.lock(&lock_key).await;
        Ok(self.store.find_or_create_conversation(participants).await?)
    }
}
