//! Caller identity extractor for Axum handlers.
//!
//! Token issuance and verification live in the upstream auth service, which
//! forwards the verified user id in [`CALLER_HEADER`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mingle_core::error::CoreError;
use mingle_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the verified caller id.
pub const CALLER_HEADER: &str = "x-user-id";

/// The user making the request.
///
/// ```ignore
/// async fn my_handler(caller: CallerId) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %caller.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CallerId {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing X-User-Id header".into(),
                ))
            })?;

        Ok(CallerId {
            user_id: user_id.to_string(),
        })
    }
}
