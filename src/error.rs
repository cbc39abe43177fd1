//! Error types for function invocation.

use crate::http::FunctionResponse;
use bytes::Bytes;
use std::time::Duration;

/// Service identifier attached to every invocation error.
pub const SERVICE: &str = "functions";

/// Message reported when the gateway flags a relay failure.
pub const RELAY_ERROR_MESSAGE: &str = "Relay Error invoking the Edge Function";

/// Errors surfaced by the transport collaborator.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{stage} timed out after {}ms", .after.as_millis())]
    Timeout { stage: TimeoutStage, after: Duration },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("stream error: {0}")]
    Stream(String),
}

/// Which bound elapsed when a [`TransportError::Timeout`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStage {
    /// Waiting for a single body chunk.
    Receive,
    /// The exchange as a whole.
    Request,
}

impl std::fmt::Display for TimeoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutStage::Receive => write!(f, "receive"),
            TimeoutStage::Request => write!(f, "request"),
        }
    }
}

impl From<hyper::Error> for TransportError {
    fn from(err: hyper::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for TransportError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Kind code of a [`FunctionsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Transport,
    Decode,
    Serialize,
    Relay,
}

impl ErrorKind {
    /// Stable snake_case code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Transport => "transport_error",
            ErrorKind::Decode => "decode_error",
            ErrorKind::Serialize => "serialize_error",
            ErrorKind::Relay => "relay_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error returned by [`Functions`](crate::Functions).
///
/// Every variant belongs to the `functions` service; use [`kind`](Self::kind)
/// to branch on the failure class and [`message`](Self::message) for a
/// human-readable description.
#[derive(Debug, thiserror::Error)]
pub enum FunctionsError {
    /// Rejected before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport failed; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be decoded as its declared content type.
    #[error("failed to decode `{content_type}` response body: {source}")]
    Decode {
        content_type: String,
        body: Bytes,
        #[source]
        source: serde_json::Error,
    },

    /// A structured request body could not be encoded as JSON.
    #[error("failed to encode JSON request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The gateway reported that the function failed upstream.
    #[error("{}", RELAY_ERROR_MESSAGE)]
    Relay { response: Box<FunctionResponse> },
}

impl FunctionsError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        FunctionsError::InvalidArgument(message.into())
    }

    /// Service that raised the error. Always `"functions"`.
    pub fn service(&self) -> &'static str {
        SERVICE
    }

    /// Kind code of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FunctionsError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            FunctionsError::Transport(_) => ErrorKind::Transport,
            FunctionsError::Decode { .. } => ErrorKind::Decode,
            FunctionsError::Serialize(_) => ErrorKind::Serialize,
            FunctionsError::Relay { .. } => ErrorKind::Relay,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Response that triggered the error, when there is one.
    pub fn response(&self) -> Option<&FunctionResponse> {
        match self {
            FunctionsError::Relay { response } => Some(response),
            _ => None,
        }
    }

    /// Returns true if the transport gave up waiting.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FunctionsError::Transport(TransportError::Timeout { .. })
        )
    }
}
