// Marketplace API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token
// attachment, and envelope classification. Endpoint modules
// (providers, bookings, etc.) are implemented as inherent methods via
// separate files to keep this module focused on transport mechanics.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// HTTP verb for an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// A single outbound request: relative path, verb, optional JSON body.
///
/// Immutable per call. Built by the typed constructors in the endpoint
/// modules, so the payload shape is checked at the call site; the body
/// is encoded once at construction.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Get,
            body: None,
        }
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, Error> {
        Ok(Self {
            path: path.into(),
            method: Method::Post,
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// POST with no body (e.g. `logout`).
    pub fn post_empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Post,
            body: None,
        }
    }

    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, Error> {
        Ok(Self {
            path: path.into(),
            method: Method::Put,
            body: Some(serde_json::to_value(body)?),
        })
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Delete,
            body: None,
        }
    }
}

// ── Envelope shapes ──────────────────────────────────────────────────

/// Probe for the error envelope. The body's `error` field is
/// authoritative: the server sometimes wraps failures in HTTP 200.
#[derive(serde::Deserialize)]
struct ErrorProbe {
    error: Option<ErrorBody>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ErrorBody {
    msg: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(serde::Deserialize)]
struct DataEnvelope<T> {
    data: T,
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
}

/// Response for mutations that acknowledge without returning an entity.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the taskfair marketplace API.
///
/// All endpoints accept JSON (or multipart for file uploads) and return
/// either `{"data": ..., "message": ...}` or `{"error": {"msg": ...}}`.
/// Methods return the unwrapped `data` payload -- the envelope is
/// stripped before the caller sees it, and every call resolves to
/// exactly one of `Ok(data)` or `Err(error)`.
///
/// Cheaply cloneable: the underlying `reqwest::Client` and the token
/// slot are shared across clones.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Ambient bearer token, set by the session layer. The client
    /// attaches it per request but does not manage refresh.
    token: Arc<ArcSwapOption<SecretString>>,
}

impl ApiClient {
    /// Create a new client from a base URL and transport config.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            token: Arc::new(ArcSwapOption::const_empty()),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (for flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Token management ─────────────────────────────────────────────

    /// Install or clear the ambient bearer token.
    pub fn set_token(&self, token: Option<SecretString>) {
        self.token.store(token.map(Arc::new));
    }

    /// Whether a bearer token is currently installed.
    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.load_full() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"get-categories"`) onto the base URL.
    fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let relative = path.trim_start_matches('/');
        self.base_url.join(relative).map_err(Error::InvalidUrl)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Execute a request and unwrap the `data` payload.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, Error> {
        let body = self.execute_raw(request).await?;
        let envelope: DataEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: e.to_string(),
                body,
            }
        })?;
        Ok(envelope.data)
    }

    /// Execute a mutation that responds with an acknowledgement only.
    pub async fn execute_ack(&self, request: &ApiRequest) -> Result<Ack, Error> {
        let body = self.execute_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// POST a multipart form (file uploads) and unwrap the `data` payload.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.endpoint_url(path)?;
        debug!("POST {url} (multipart)");

        let builder = self.authorized(self.http.post(url).multipart(form));
        let resp = builder.send().await.map_err(Error::Transport)?;
        let body = self.classify(resp).await?;

        let envelope: DataEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: e.to_string(),
                body,
            }
        })?;
        Ok(envelope.data)
    }

    async fn execute_raw(&self, request: &ApiRequest) -> Result<String, Error> {
        let url = self.endpoint_url(&request.path)?;
        debug!("{} {url}", request.method);

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = self.authorized(builder).send().await.map_err(Error::Transport)?;
        self.classify(resp).await
    }

    /// Classify the response: error envelope (authoritative, even on
    /// 2xx), then HTTP status, then hand the body to the caller.
    async fn classify(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if let Ok(probe) = serde_json::from_str::<ErrorProbe>(&body) {
            if let Some(err) = probe.error {
                if status == StatusCode::UNAUTHORIZED {
                    return Err(Error::Unauthorized);
                }
                return Err(Error::Api {
                    message: err.msg,
                    code: err.code,
                    status: status.as_u16(),
                });
            }
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            return Err(Error::Api {
                message: format!("HTTP {status}: {preview}"),
                code: None,
                status: status.as_u16(),
            });
        }

        Ok(body)
    }
}

/// Base URLs must end with `/` so `Url::join` keeps the full path.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = Url::parse("https://api.example.com/v1").unwrap();
        assert_eq!(normalize_base_url(url).path(), "/v1/");
    }

    #[test]
    fn endpoint_url_joins_relative_paths() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://api.example.com/v1").unwrap(),
        );
        let url = client.endpoint_url("/get-categories").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/get-categories");
    }

    #[test]
    fn post_request_encodes_body_once() {
        #[derive(serde::Serialize)]
        struct Payload {
            amount: &'static str,
        }
        let req = ApiRequest::post("provider/withdrawals/request", &Payload { amount: "50.00" })
            .unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(
            req.body.unwrap(),
            serde_json::json!({ "amount": "50.00" })
        );
    }
}
