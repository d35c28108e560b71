use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use mingle_core::types::{Timestamp, UserId};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// User id supplied at handshake, if any.
    pub user_id: Option<UserId>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
    /// Rooms this connection currently belongs to.
    pub rooms: HashSet<String>,
}

/// Manages all active WebSocket connections and their room membership.
///
/// Membership is stored on the connection itself, so removing a connection
/// removes it from every room. Thread-safe via interior `RwLock`; designed to
/// be wrapped in `Arc` and shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<UserId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
            rooms: HashSet::new(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, dropping all of its room memberships.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Handshake user of a connection.
    pub async fn user_of(&self, conn_id: &str) -> Option<UserId> {
        self.connections
            .read()
            .await
            .get(conn_id)
            .and_then(|conn| conn.user_id.clone())
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Add a connection to a room.
    ///
    /// Returns `true` if the connection was not yet a member. Joining twice
    /// is a no-op; empty room names and unknown connections are ignored.
    pub async fn join(&self, conn_id: &str, room: &str) -> bool {
        if room.trim().is_empty() {
            tracing::warn!(conn_id = %conn_id, "Ignoring join of empty room name");
            return false;
        }
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => conn.rooms.insert(room.to_string()),
            None => false,
        }
    }

    /// Remove a connection from a room. Returns `true` if it was a member.
    pub async fn leave(&self, conn_id: &str, room: &str) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => conn.rooms.remove(room),
            None => false,
        }
    }

    /// Rooms a connection belongs to, sorted.
    pub async fn rooms_of(&self, conn_id: &str) -> Vec<String> {
        let conns = self.connections.read().await;
        let mut rooms: Vec<String> = conns
            .get(conn_id)
            .map(|conn| conn.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Connection IDs currently in a room, sorted.
    pub async fn room_members(&self, room: &str) -> Vec<String> {
        let conns = self.connections.read().await;
        let mut members: Vec<String> = conns
            .iter()
            .filter(|(_, conn)| conn.rooms.contains(room))
            .map(|(id, _)| id.clone())
            .collect();
        members.sort();
        members
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    /// Send a message to a single connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        match self.connections.read().await.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Send a message to every member of a room, optionally skipping one
    /// connection (the originator).
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn send_to_room(&self, room: &str, message: Message, except: Option<&str>) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for (id, conn) in conns.iter() {
            if !conn.rooms.contains(room) || except == Some(id.as_str()) {
                continue;
            }
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Broadcast a message to all connected clients.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
