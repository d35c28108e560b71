//! Realtime chat gateway over the WebSocket transport.

pub mod error;
pub mod gateway;
pub mod ingest;
pub mod presence;
pub mod protocol;
pub mod typing;

pub use error::GatewayError;
pub use gateway::Gateway;
pub use ingest::{Ingested, KeyedLocks, MessageIngestor};
pub use presence::PresenceTable;
pub use protocol::{ChatMessage, ClientEvent, ServerEvent};
