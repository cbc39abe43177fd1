//! Raw and decoded function responses.

use crate::http::Headers;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    /// Check if the status code indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Check if the status code indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Check if the status code indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl From<hyper::StatusCode> for StatusCode {
    fn from(code: hyper::StatusCode) -> Self {
        StatusCode(code.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully buffered response as returned by the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header to the response.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Parsed `application/json` payload.
    Json(serde_json::Value),
    /// Any other content type, passed through unchanged.
    Raw(Bytes),
}

impl ResponseBody {
    /// Borrow the body as text if it is raw and valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResponseBody::Raw(bytes) => std::str::from_utf8(bytes).ok(),
            ResponseBody::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseBody::Raw(bytes) => Some(bytes),
            ResponseBody::Json(_) => None,
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.as_json().map(|value| T::deserialize(value))
    }
}

/// Decoded response of a buffered invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// HTTP headers.
    pub headers: Headers,
    /// Decoded body.
    pub body: ResponseBody,
}

impl FunctionResponse {
    /// Get a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Get the body as text if it was passed through as valid UTF-8.
    pub fn text_body(&self) -> Option<&str> {
        self.body.as_str()
    }
}
