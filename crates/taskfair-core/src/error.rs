// ── Core error types ──
//
// User-facing errors from taskfair-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<taskfair_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants; fetch and query state carry the
// rendered message, never the raw error.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot reach the taskfair service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("The request timed out -- check your connection and retry")]
    Timeout,

    #[error("Please sign in again")]
    SessionExpired,

    // Server-supplied message, shown verbatim.
    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
    },

    #[error("Unexpected response from the service")]
    BadResponse { detail: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<taskfair_api::Error> for CoreError {
    fn from(err: taskfair_api::Error) -> Self {
        match err {
            taskfair_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            }
            taskfair_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            taskfair_api::Error::Serialization(e) => {
                CoreError::Internal(format!("request encoding failed: {e}"))
            }
            taskfair_api::Error::Unauthorized => CoreError::SessionExpired,
            taskfair_api::Error::Api { message, code, .. } => CoreError::Api { message, code },
            taskfair_api::Error::Deserialization { message, .. } => {
                CoreError::BadResponse { detail: message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_shown_verbatim() {
        let err = CoreError::from(taskfair_api::Error::Api {
            message: "Account not verified".into(),
            code: None,
            status: 200,
        });
        assert_eq!(err.to_string(), "Account not verified");
    }

    #[test]
    fn unauthorized_becomes_session_expired() {
        let err = CoreError::from(taskfair_api::Error::Unauthorized);
        assert!(matches!(err, CoreError::SessionExpired));
    }
}
