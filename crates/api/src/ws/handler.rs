use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use mingle_core::types::UserId;
use serde::Deserialize;

use crate::realtime::Gateway;
use crate::state::AppState;

/// Handshake parameters accepted on the upgrade request (`/ws?userId=...`).
#[derive(Debug, Default, Deserialize)]
pub struct Handshake {
    /// Used only to auto-join the user's personal room.
    #[serde(rename = "userId")]
    pub user_id: Option<UserId>,
}

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(handshake): Query<Handshake>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user_id = handshake.user_id.filter(|id| !id.trim().is_empty());
    ws.on_upgrade(move |socket| handle_socket(socket, state.gateway, user_id))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the gateway.
///   2. Spawns a sender task that forwards queued outbound frames.
///   3. Feeds inbound text frames to the gateway one at a time, so handlers
///      for the same connection never interleave.
///   4. Reports the disconnect to the gateway.
async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>, user_id: Option<UserId>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id = ?user_id, "WebSocket connected");

    let mut rx = gateway.connect(&conn_id, user_id).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => gateway.handle_text(&conn_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(conn_id = %conn_id, "Ignoring binary frame");
            }
            Ok(Message::Ping(_)) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    gateway.disconnect(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
