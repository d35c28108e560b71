//! Typing indicator relay.
//!
//! Stateless: each signal is forwarded to the conversation room once and
//! never reaches the connection that sent it.

use mingle_core::channel_key::ChannelKey;
use mingle_core::error::CoreError;
use mingle_core::messaging::validate_username;
use mingle_core::rooms::conversation_room;

use crate::realtime::error::GatewayError;
use crate::realtime::protocol::{ServerEvent, TypingNotice, TypingSignal};
use crate::ws::WsManager;

/// Whether the user started or stopped typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Started,
    Stopped,
}

/// Relay a typing signal from `conn_id` to the rest of its conversation room.
///
/// Returns the number of connections notified.
pub async fn relay(
    ws: &WsManager,
    conn_id: &str,
    signal: &TypingSignal,
    state: TypingState,
) -> Result<usize, GatewayError> {
    let key = ChannelKey::new(signal.conversation_id.as_str())?;
    validate_username(&signal.username).map_err(CoreError::Validation)?;

    let notice = TypingNotice {
        username: signal.username.clone(),
    };
    let event = match state {
        TypingState::Started => ServerEvent::UserTyping(notice),
        TypingState::Stopped => ServerEvent::UserStopTyping(notice),
    };

    Ok(ws
        .send_to_room(&conversation_room(&key), event.encode()?, Some(conn_id))
        .await)
}
