//! Stateless HTTP request builder and response parser for the library API.
//!
//! # Design
//! `LibraryClient` holds only a `base_url` and an optional access token and
//! carries no mutable state between calls. Each backend operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. The caller executes the actual
//! HTTP round-trip, keeping the core deterministic and free of I/O.
//!
//! Operations are grouped by resource in the submodules; each adds an
//! `impl LibraryClient` block.

mod auth;
mod books;
mod borrows;
mod system;
mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Synchronous, stateless client for the library API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    base_url: String,
    access_token: Option<String>,
}

impl LibraryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// A copy of this client that sends `authorization: Bearer <token>`.
    pub fn with_access_token(&self, token: &str) -> Self {
        Self {
            base_url: self.base_url.clone(),
            access_token: Some(token.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = &self.access_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    fn query_request<P: Serialize>(
        &self,
        path: &str,
        params: &P,
    ) -> Result<HttpRequest, ApiError> {
        let mut req = self.request(HttpMethod::Get, path);
        req.query = query_pairs(params)?;
        Ok(req)
    }
}

/// Flatten a params struct into query pairs.
///
/// `None` fields are dropped; scalars are rendered without JSON quoting so
/// `true`, `2` and `borrowed` go out as-is. Pairs come out sorted by key,
/// not in field order.
pub(crate) fn query_pairs<P: Serialize>(params: &P) -> Result<Vec<(String, String)>, ApiError> {
    let value =
        serde_json::to_value(params).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(ApiError::SerializationError(
            "query parameters must serialize to an object".to_string(),
        ));
    };
    let pairs = map
        .into_iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, rendered))
        })
        .collect();
    Ok(pairs)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    tracing::debug!(status = response.status, "library API returned an error status");
    match response.status {
        404 => Err(ApiError::NotFound),
        401 => Err(ApiError::Unauthorized(response.body.clone())),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Accept any 2xx and ignore the body.
fn parse_empty(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)
}
