//! Async Rust client for the taskfair marketplace HTTP API.
//!
//! The remote API speaks JSON (multipart for file uploads) and wraps
//! every response in an envelope: `{"data": ..., "message": ...}` on
//! success, `{"error": {"msg": ...}}` on failure. HTTP status codes are
//! advisory -- the body's `error` field is authoritative, and
//! [`ApiClient`] normalizes both into a single [`Error`] taxonomy so
//! callers never distinguish transport failure from application failure
//! unless they want to.
//!
//! Surfaces:
//!
//! - **[`ApiClient`]** -- envelope-aware HTTP client with an ambient
//!   bearer token slot, built via [`TransportConfig`].
//! - **[`ApiRequest`]** -- the uniform request descriptor (path, verb,
//!   encoded body) constructed by the typed endpoint modules.
//! - **[`endpoints`]** -- wire records and typed payloads per API area:
//!   categories, providers, bookings, payments, quotes, dashboard,
//!   session.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Ack, ApiClient, ApiRequest, Method};
pub use error::Error;
pub use transport::TransportConfig;
