//! Wire protocol of the realtime channel.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": <payload>}`.
//! Inbound frames decode into the closed [`ClientEvent`] set; anything else
//! is rejected before dispatch.

use axum::extract::ws::Message;
use mingle_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::realtime::error::GatewayError;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    UserOnline(UserId),
    JoinRoom(RoomRequest),
    LeaveRoom(RoomRequest),
    SendMessage(SendMessage),
    Typing(TypingSignal),
    StopTyping(TypingSignal),
}

impl ClientEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::UserOnline(_) => "user-online",
            ClientEvent::JoinRoom(_) => "join-room",
            ClientEvent::LeaveRoom(_) => "leave-room",
            ClientEvent::SendMessage(_) => "send-message",
            ClientEvent::Typing(_) => "typing",
            ClientEvent::StopTyping(_) => "stop-typing",
        }
    }

    /// Decode one text frame.
    ///
    /// On failure the error still carries the event name when the envelope
    /// was readable, so the acknowledgement can say which request failed.
    pub fn decode(text: &str) -> Result<Self, GatewayError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| GatewayError::Decode {
                event: None,
                reason: e.to_string(),
            })?;

        let event = value
            .get("event")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        serde_json::from_value(value).map_err(|e| GatewayError::Decode {
            event,
            reason: e.to_string(),
        })
    }
}

/// Payload of `join-room` / `leave-room`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub conversation_id: String,
}

/// Payload of `send-message`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub conversation_id: String,
    pub message: ChatMessage,
}

/// A chat message as exchanged with clients.
///
/// `sender` and `content` are required; any other client fields (temporary
/// ids, display names) are kept and echoed back in `receive-message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: UserId,
    pub content: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Payload of `typing` / `stop-typing`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSignal {
    pub conversation_id: String,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    UpdateOnlineUsers(Vec<UserId>),
    ReceiveMessage(ChatMessage),
    UserTyping(TypingNotice),
    UserStopTyping(TypingNotice),
    NewNotification(serde_json::Value),
    Error(ErrorAck),
}

impl ServerEvent {
    pub fn encode(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(serde_json::to_string(self)?.into()))
    }
}

/// Payload of `user-typing` / `user-stop-typing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingNotice {
    pub username: String,
}

/// Payload of `error`: which inbound event failed and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAck {
    pub event: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
