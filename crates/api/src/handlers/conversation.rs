//! Handlers for the `/conversations` resource.
//!
//! Request-driven access to the same conversations the realtime gateway
//! writes. Every endpoint identifies the caller via [`CallerId`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mingle_core::channel_key::ParticipantSet;
use mingle_core::error::CoreError;
use mingle_core::messaging::validate_message_content;
use mingle_core::types::{DbId, UserId};
use mingle_db::models::conversation::{Conversation, ConversationDetail, CreateGroup};
use mingle_db::models::message::{Message, NewMessage};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::caller::CallerId;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /conversations/direct`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectRequest {
    pub participant_id: UserId,
}

/// Body of `POST /conversations/group`.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub participants: Vec<UserId>,
}

/// Body of `POST /conversations/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// A conversation with its full message history.
#[derive(Debug, Serialize)]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    pub detail: ConversationDetail,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/conversations/direct
///
/// Return the caller's direct conversation with `participantId`, creating it
/// when absent. Responds 201 on creation and 200 when it already existed.
pub async fn create_direct(
    caller: CallerId,
    State(state): State<AppState>,
    Json(input): Json<CreateDirectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Conversation>>)> {
    let pair = ParticipantSet::new([caller.user_id, input.participant_id])?;

    if let Some(existing) = state.store.find_direct(&pair).await? {
        return Ok((StatusCode::OK, Json(DataResponse { data: existing })));
    }

    let conversation = state.store.find_or_create_conversation(&pair).await?;
    tracing::info!(conversation_id = conversation.id, "Direct conversation created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: conversation })))
}

/// GET /api/v1/conversations
///
/// The caller's conversations, most recently active first.
pub async fn list_conversations(
    caller: CallerId,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Conversation>>>> {
    let conversations = state.store.list_for_user(&caller.user_id).await?;
    Ok(Json(DataResponse {
        data: conversations,
    }))
}

/// POST /api/v1/conversations/group
///
/// Create a named group administered by the caller.
pub async fn create_group(
    caller: CallerId,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Conversation>>)> {
    let conversation = state
        .store
        .create_group(&CreateGroup {
            name: input.name,
            admin: caller.user_id,
            participants: input.participants,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: conversation })))
}

/// GET /api/v1/conversations/with/{friend_id}
///
/// The caller's direct conversation with `friend_id`, including messages.
pub async fn get_with_friend(
    caller: CallerId,
    State(state): State<AppState>,
    Path(friend_id): Path<UserId>,
) -> AppResult<Json<DataResponse<ConversationWithMessages>>> {
    let pair = ParticipantSet::new([caller.user_id, friend_id])?;

    let conversation = state
        .store
        .find_direct(&pair)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;

    let detail = state.store.get_conversation(conversation.id).await?;
    let messages = state.store.list_messages(conversation.id).await?;

    Ok(Json(DataResponse {
        data: ConversationWithMessages { detail, messages },
    }))
}

/// GET /api/v1/conversations/{id}/messages
pub async fn list_messages(
    caller: CallerId,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    ensure_participant(&state, id, &caller.user_id).await?;
    let messages = state.store.list_messages(id).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/v1/conversations/{id}/messages
///
/// Append a message sent by the caller. The message is stored only; live
/// delivery to room members stays with the realtime gateway.
pub async fn send_message(
    caller: CallerId,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    ensure_participant(&state, id, &caller.user_id).await?;
    validate_message_content(&input.content).map_err(CoreError::Validation)?;

    let message = state
        .store
        .append_message(
            id,
            &NewMessage {
                sender: caller.user_id,
                content: input.content,
            },
        )
        .await?;
    tracing::debug!(conversation_id = id, message_id = message.id, "Message appended");

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// POST /api/v1/conversations/{id}/read
///
/// Mark every message the caller did not send as read.
pub async fn mark_read(
    caller: CallerId,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    ensure_participant(&state, id, &caller.user_id).await?;
    let marked_read = state.store.mark_read(id, &caller.user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

async fn ensure_participant(state: &AppState, id: DbId, user_id: &str) -> AppResult<()> {
    let detail = state.store.get_conversation(id).await?;
    if !detail.conversation.participants.iter().any(|p| p == user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a participant of this conversation".into(),
        )));
    }
    Ok(())
}
