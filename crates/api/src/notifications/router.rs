//! Event-to-socket notification routing.

use std::sync::Arc;

use mingle_core::rooms::personal_room;
use mingle_events::event_types::is_notification;
use mingle_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::realtime::ServerEvent;
use crate::ws::WsManager;

/// Forwards notification events from the bus to connected recipients.
///
/// Delivery is best effort: a recipient without an open connection simply
/// misses the push and picks the notification up through its own listing.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the routing loop until the [`EventBus`](mingle_events::EventBus)
    /// is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Push one event; returns how many connections received it.
    pub async fn route_event(&self, event: &PlatformEvent) -> Result<usize, serde_json::Error> {
        if !is_notification(&event.event_type) {
            return Ok(0);
        }

        let Some(recipient) = event.recipient_user_id.as_deref() else {
            tracing::warn!(event_type = %event.event_type, "Notification without recipient");
            return Ok(0);
        };

        if event.actor_user_id.as_deref() == Some(recipient) {
            return Ok(0);
        }

        let message = ServerEvent::NewNotification(event.payload.clone()).encode()?;
        let delivered = self
            .ws_manager
            .send_to_room(&personal_room(recipient), message, None)
            .await;

        tracing::debug!(
            event_type = %event.event_type,
            user_id = %recipient,
            delivered,
            "Notification pushed"
        );
        Ok(delivered)
    }
}
