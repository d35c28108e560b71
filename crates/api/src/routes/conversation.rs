//! Route definitions for the `/conversations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::conversation;
use crate::state::AppState;

/// Routes mounted at `/conversations`.
///
/// ```text
/// GET    /                    -> list_conversations
/// POST   /direct              -> create_direct
/// POST   /group               -> create_group
/// GET    /with/{friend_id}    -> get_with_friend
/// GET    /{id}/messages       -> list_messages
/// POST   /{id}/messages       -> send_message
/// POST   /{id}/read           -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conversation::list_conversations))
        .route("/direct", post(conversation::create_direct))
        .route("/group", post(conversation::create_group))
        .route("/with/{friend_id}", get(conversation::get_with_friend))
        .route(
            "/{id}/messages",
            get(conversation::list_messages).post(conversation::send_message),
        )
        .route("/{id}/read", post(conversation::mark_read))
}
