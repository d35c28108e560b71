pub mod conversation;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                    WebSocket (?userId=)
///
/// /conversations                         list (caller's, most recent first)
/// /conversations/direct                  find or create direct (POST)
/// /conversations/group                   create group (POST)
/// /conversations/with/{friend_id}        direct conversation with messages
/// /conversations/{id}/messages           message history, send (POST)
/// /conversations/{id}/read               mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/conversations", conversation::router())
}
