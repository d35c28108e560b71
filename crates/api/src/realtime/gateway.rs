use std::sync::Arc;

use axum::extract::ws::Message;
use mingle_core::channel_key::ChannelKey;
use mingle_core::error::CoreError;
use mingle_core::rooms::{conversation_room, personal_room};
use mingle_core::types::UserId;
use mingle_db::store::ChatStore;
use tokio::sync::{mpsc, Mutex};

use crate::realtime::error::GatewayError;
use crate::realtime::ingest::MessageIngestor;
use crate::realtime::presence::PresenceTable;
use crate::realtime::protocol::{ClientEvent, ErrorAck, SendMessage, ServerEvent};
use crate::realtime::typing::{self, TypingState};
use crate::ws::WsManager;

/// Event name used in acknowledgements for frames that never decoded.
const UNKNOWN_EVENT: &str = "unknown";

/// Dispatches realtime events for every connection.
///
/// Sole writer of the presence table and sole broadcaster on the channel.
/// Durable state is only read and written through the [`ChatStore`].
pub struct Gateway {
    ws: Arc<WsManager>,
    presence: Mutex<PresenceTable>,
    ingestor: MessageIngestor,
}

impl Gateway {
    pub fn new(ws: Arc<WsManager>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            ws,
            presence: Mutex::new(PresenceTable::new()),
            ingestor: MessageIngestor::new(store),
        }
    }

    pub fn ws_manager(&self) -> &Arc<WsManager> {
        &self.ws
    }

    /// Users currently announced online, in announcement order.
    pub async fn online_users(&self) -> Vec<UserId> {
        self.presence.lock().await.online_users()
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Register a new connection.
    ///
    /// A handshake user id only joins the personal room; the user becomes
    /// visible as online after an explicit `user-online`.
    pub async fn connect(
        &self,
        conn_id: &str,
        user_id: Option<UserId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let rx = self.ws.add(conn_id.to_string(), user_id.clone()).await;
        if let Some(user_id) = user_id {
            self.ws.join(conn_id, &personal_room(&user_id)).await;
        }
        rx
    }

    /// Tear down a connection and publish the resulting online list.
    ///
    /// The transport's close is the only signal that removes presence.
    pub async fn disconnect(&self, conn_id: &str) {
        {
            let mut presence = self.presence.lock().await;
            let online = presence.remove_by_connection(conn_id);
            self.broadcast_all(&ServerEvent::UpdateOnlineUsers(online))
                .await;
        }
        self.ws.remove(conn_id).await;
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Decode and dispatch one inbound text frame.
    ///
    /// Failures are logged and acknowledged to the sender with an `error`
    /// event; the connection stays open.
    pub async fn handle_text(&self, conn_id: &str, text: &str) {
        let (event_name, result) = match ClientEvent::decode(text) {
            Ok(event) => (event.name().to_string(), self.dispatch(conn_id, event).await),
            Err(err) => {
                let name = match &err {
                    GatewayError::Decode {
                        event: Some(name), ..
                    } => name.clone(),
                    _ => UNKNOWN_EVENT.to_string(),
                };
                (name, Err(err))
            }
        };

        if let Err(err) = result {
            tracing::warn!(
                conn_id = %conn_id,
                event = %event_name,
                error = %err,
                "Realtime event failed"
            );
            let ack = ServerEvent::Error(ErrorAck {
                event: event_name,
                message: err.client_message(),
            });
            self.send_to(conn_id, &ack).await;
        }
    }

    /// Run the handler for one decoded event.
    pub async fn dispatch(&self, conn_id: &str, event: ClientEvent) -> Result<(), GatewayError> {
        match event {
            ClientEvent::UserOnline(user_id) => self.user_online(conn_id, user_id).await,
            ClientEvent::JoinRoom(req) => {
                let key = ChannelKey::new(req.conversation_id)?;
                self.ws.join(conn_id, &conversation_room(&key)).await;
                Ok(())
            }
            ClientEvent::LeaveRoom(req) => {
                let key = ChannelKey::new(req.conversation_id)?;
                self.ws.leave(conn_id, &conversation_room(&key)).await;
                Ok(())
            }
            ClientEvent::SendMessage(send) => self.send_message(conn_id, send).await,
            ClientEvent::Typing(signal) => {
                typing::relay(&self.ws, conn_id, &signal, TypingState::Started).await?;
                Ok(())
            }
            ClientEvent::StopTyping(signal) => {
                typing::relay(&self.ws, conn_id, &signal, TypingState::Stopped).await?;
                Ok(())
            }
        }
    }

    async fn user_online(&self, conn_id: &str, user_id: UserId) -> Result<(), GatewayError> {
        let user_id = user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(CoreError::Validation("userId must not be empty".into()).into());
        }

        self.ws.join(conn_id, &personal_room(&user_id)).await;

        let mut presence = self.presence.lock().await;
        let online = presence.set_online(user_id.clone(), conn_id.to_string());
        tracing::info!(conn_id = %conn_id, user_id = %user_id, online = online.len(), "User online");
        self.broadcast_all(&ServerEvent::UpdateOnlineUsers(online))
            .await;
        Ok(())
    }

    async fn send_message(&self, conn_id: &str, send: SendMessage) -> Result<(), GatewayError> {
        let key = ChannelKey::new(send.conversation_id)?;
        let ingested = self.ingestor.ingest(&key, &send.message).await?;

        // The sender renders its own message from this broadcast.
        let delivered = self
            .ws
            .send_to_room(
                &conversation_room(&key),
                ServerEvent::ReceiveMessage(send.message).encode()?,
                None,
            )
            .await;

        tracing::debug!(
            conn_id = %conn_id,
            conversation_id = ingested.conversation.id,
            delivered,
            "Message broadcast"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Outbound helpers
    // -----------------------------------------------------------------------

    async fn broadcast_all(&self, event: &ServerEvent) {
        match event.encode() {
            Ok(message) => self.ws.broadcast(message).await,
            Err(e) => tracing::error!(error = %e, "Failed to encode broadcast"),
        }
    }

    async fn send_to(&self, conn_id: &str, event: &ServerEvent) {
        match event.encode() {
            Ok(message) => {
                self.ws.send_to(conn_id, message).await;
            }
            Err(e) => tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode event"),
        }
    }
}
