//! Error types for the library API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers
//! routinely branch on "the record does not exist" and "the session is no
//! longer valid". All other non-2xx responses land in `HttpError` with the
//! raw status code and body. The backend reports failures as
//! `{"detail": "..."}`; [`ApiError::detail`] digs that message out.

use thiserror::Error;

/// Errors returned by `LibraryClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested record does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401. Carries the raw response body.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server returned a non-2xx status other than 401 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, timeout...).
    #[error("transport failed: {0}")]
    TransportError(String),
}

impl ApiError {
    /// HTTP status behind this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's `detail` message for `HttpError` and `Unauthorized`.
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            ApiError::HttpError { body, .. } | ApiError::Unauthorized(body) => body,
            _ => return None,
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
