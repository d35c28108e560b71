//! WebSocket transport for the realtime channel.
//!
//! Provides the connection and room registry, heartbeat pings, and the HTTP
//! upgrade handler that feeds frames into the realtime gateway.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{ws_handler, Handshake};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
