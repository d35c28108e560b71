use mingle_core::error::CoreError;
use mingle_db::store::StoreError;

/// Failure of a single inbound realtime event.
///
/// Never closes the connection: the gateway logs it and acknowledges the
/// sender with an `error` event.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The frame was not a well-formed [`ClientEvent`](super::ClientEvent).
    #[error("Malformed event: {reason}")]
    Decode {
        event: Option<String>,
        reason: String,
    },

    /// A domain rule rejected the payload.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence gateway failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An outbound event could not be serialized.
    #[error("Failed to encode outbound event: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Message safe to send back to the client.
    ///
    /// Database and encoding details stay in the server log.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Decode { .. } | GatewayError::Core(_) => self.to_string(),
            GatewayError::Store(StoreError::Core(core)) => core.to_string(),
            GatewayError::Store(StoreError::Database(_)) | GatewayError::Encode(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_details_are_not_exposed() {
        let err = GatewayError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.client_message(), "An internal error occurred");
    }

    #[test]
    fn validation_message_is_exposed() {
        let err = GatewayError::Core(CoreError::Validation("bad key".into()));
        assert_eq!(err.client_message(), "Validation failed: bad key");
    }
}
