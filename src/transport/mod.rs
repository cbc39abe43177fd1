//! Transport seam between the invocation pipeline and the network.

use crate::error::TransportError;
use crate::http::{FunctionRequest, Headers, RawResponse, StatusCode};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;
use std::time::Duration;

mod config;
pub mod hyper_client;

pub use self::config::TransportConfig;
pub use self::hyper_client::HyperTransport;

/// Timeout applied when an invocation does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Lazily produced response body chunks. Consumable once.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Bounds handed to the transport for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Longest wait for any single body chunk.
    pub receive_timeout: Duration,
    /// Longest wait for the whole exchange.
    pub request_timeout: Duration,
}

impl Timeouts {
    /// Use the same bound for both chunk receipt and the whole exchange.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            receive_timeout: timeout,
            request_timeout: timeout,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(DEFAULT_TIMEOUT)
    }
}

/// Response head plus a body that is still arriving.
pub struct StreamingResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub chunks: ChunkStream,
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends request descriptors over the network.
///
/// Implementations own every network concern: connecting, enforcing the
/// [`Timeouts`], and aborting when a bound elapses. Errors are returned
/// as-is to the caller of the invocation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and drain the whole response.
    async fn send(
        &self,
        request: FunctionRequest,
        timeouts: Timeouts,
    ) -> Result<RawResponse, TransportError>;

    /// Send the request and return as soon as the response head arrives.
    ///
    /// The returned chunk stream must enforce `receive_timeout` per chunk and
    /// `request_timeout` for the exchange as a whole.
    async fn send_streaming(
        &self,
        request: FunctionRequest,
        timeouts: Timeouts,
    ) -> Result<StreamingResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.receive_timeout, Duration::from_millis(15_000));
        assert_eq!(timeouts.request_timeout, Duration::from_millis(15_000));
    }
}
