// Session endpoints. The client consumes an ambient token; these
// endpoints exist so the session file can be minted and revoked. Token
// refresh is the server's problem, not ours.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{Ack, ApiClient, ApiRequest};
use crate::error::Error;

/// Payload for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// A freshly minted session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub account_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_provider: Option<bool>,
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// Does NOT install the token -- the session layer decides where it
    /// lives and calls [`ApiClient::set_token`](crate::ApiClient::set_token).
    pub async fn login(&self, payload: &LoginPayload) -> Result<SessionRecord, Error> {
        debug!(email = %payload.email, "logging in");
        self.execute(&ApiRequest::post("login", payload)?).await
    }

    /// Revoke the current session server-side.
    pub async fn logout(&self) -> Result<Ack, Error> {
        self.execute_ack(&ApiRequest::post_empty("logout")).await
    }
}
