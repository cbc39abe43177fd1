//! Streaming response handlers.

use crate::error::FunctionsError;
use crate::http::{Headers, StatusCode};
use crate::transport::ChunkStream;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use std::future::Future;

/// Receives a streamed response and decides the invocation result.
///
/// The handler is called once, with the response head and a chunk stream
/// that can be read at most once. It may stop reading at any point. Its
/// result is returned to the caller unchanged: no body decoding and no
/// `x-relay-error` check is applied.
///
/// Closures of the form `|status, headers, chunks| async move { ... }`
/// implement this trait.
#[async_trait]
pub trait ResponseHandler: Send {
    /// Value produced for the caller.
    type Output: Send;

    /// Consume the streamed response.
    async fn receive(
        self,
        status: StatusCode,
        headers: Headers,
        chunks: ChunkStream,
    ) -> Result<Self::Output, FunctionsError>;
}

#[async_trait]
impl<F, Fut, T> ResponseHandler for F
where
    F: FnOnce(StatusCode, Headers, ChunkStream) -> Fut + Send,
    Fut: Future<Output = Result<T, FunctionsError>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn receive(
        self,
        status: StatusCode,
        headers: Headers,
        chunks: ChunkStream,
    ) -> Result<T, FunctionsError> {
        (self)(status, headers, chunks).await
    }
}

/// Handler that concatenates every chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectBody;

#[async_trait]
impl ResponseHandler for CollectBody {
    type Output = Bytes;

    async fn receive(
        self,
        _status: StatusCode,
        _headers: Headers,
        mut chunks: ChunkStream,
    ) -> Result<Bytes, FunctionsError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = chunks.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: &[&'static str]) -> ChunkStream {
        let items: Vec<_> = parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect();
        Box::pin(stream::iter(items))
    }

    #[test]
    fn test_collect_body() {
        let body = tokio_test::block_on(CollectBody.receive(
            StatusCode::OK,
            Headers::new(),
            chunks(&["a", "b", "c"]),
        ))
        .unwrap();
        assert_eq!(body, Bytes::from_static(b"abc"));
    }

    #[test]
    fn test_closure_may_stop_early() {
        let handler = |status: StatusCode, _headers: Headers, mut chunks: ChunkStream| async move {
            let first = chunks.next().await.transpose()?;
            Ok::<_, FunctionsError>((status, first))
        };

        let (status, first) =
            tokio_test::block_on(handler.receive(StatusCode::CREATED, Headers::new(), chunks(&["x", "y"])))
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first, Some(Bytes::from_static(b"x")));
    }
}
