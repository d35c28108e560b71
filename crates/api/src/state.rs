use std::sync::Arc;

use mingle_db::store::ChatStore;
use mingle_events::EventBus;

use crate::config::ServerConfig;
use crate::realtime::Gateway;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway (Postgres or in-memory).
    pub store: Arc<dyn ChatStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection and room registry.
    pub ws_manager: Arc<WsManager>,
    /// Realtime event dispatcher; sole owner of the presence table.
    pub gateway: Arc<Gateway>,
    /// Centralized event bus for notification events.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Wire a gateway and event bus around the given store.
    pub fn new(store: Arc<dyn ChatStore>, config: ServerConfig) -> Self {
        let ws_manager = Arc::new(WsManager::new());
        let gateway = Arc::new(Gateway::new(Arc::clone(&ws_manager), Arc::clone(&store)));
        Self {
            store,
            config: Arc::new(config),
            ws_manager,
            gateway,
            event_bus: Arc::new(EventBus::default()),
        }
    }
}
