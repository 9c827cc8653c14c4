use thiserror::Error;

/// Top-level error type for the `taskfair-api` crate.
///
/// Every failure mode a request can hit collapses into one of these
/// variants: transport problems, the server's error envelope, and
/// responses we could not make sense of. `taskfair-core` maps them
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or rejected bearer token.
    #[error("Not signed in or session expired")]
    Unauthorized,

    /// Error envelope from the marketplace API.
    ///
    /// The `message` is server-supplied and shown verbatim to the user.
    /// Present whenever the body carries `{"error": {"msg": ...}}`,
    /// regardless of HTTP status, or when a non-2xx response arrives
    /// without a parseable envelope.
    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Unexpected response from server: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying
    /// (retry is always user-initiated; this only informs messaging).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if this error indicates the session token is
    /// missing or no longer accepted.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Extract the API error code, if the server sent one.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
