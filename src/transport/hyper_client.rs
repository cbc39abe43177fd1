//! Default transport built on hyper's client.

use crate::error::{TimeoutStage, TransportError};
use crate::http::{FunctionRequest, Headers, RawResponse, StatusCode};
use crate::transport::{StreamingResponse, Timeouts, Transport, TransportConfig};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Transport speaking plain HTTP/1.1 through hyper.
///
/// HTTPS endpoints need a custom [`Transport`] with a TLS-capable connector.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    config: TransportConfig,
}

impl HyperTransport {
    /// Create a new transport.
    pub fn new(config: TransportConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client, config }
    }

    /// Create a new transport with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TransportConfig::default())
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send the request and wait for the response head.
    async fn dispatch(
        &self,
        request: FunctionRequest,
        deadline: Instant,
        timeouts: Timeouts,
    ) -> Result<(StatusCode, Headers, Incoming), TransportError> {
        let url = request.url.clone();
        let method = request.method;
        let req = self.build_request(request)?;

        debug!("Sending {} {}", method, url);

        let response = tokio::time::timeout_at(deadline, self.client.request(req))
            .await
            .map_err(|_| TransportError::Timeout {
                stage: TimeoutStage::Request,
                after: timeouts.request_timeout,
            })??;

        let (parts, body) = response.into_parts();
        let status = StatusCode::from(parts.status);
        debug!("Received {} from {} {}", status, method, url);

        Ok((status, Headers::from(&parts.headers), body))
    }

    /// Convert a request descriptor into a hyper request.
    fn build_request(
        &self,
        request: FunctionRequest,
    ) -> Result<hyper::Request<Full<Bytes>>, TransportError> {
        let mut builder = hyper::Request::builder()
            .method(hyper::Method::from(request.method))
            .uri(request.url.as_str());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if !request.headers.contains("user-agent") {
            builder = builder.header(hyper::header::USER_AGENT, self.config.user_agent.as_str());
        }

        builder
            .body(Full::new(request.body.unwrap_or_default()))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(
        &self,
        request: FunctionRequest,
        timeouts: Timeouts,
    ) -> Result<RawResponse, TransportError> {
        let deadline = Instant::now() + timeouts.request_timeout;
        let (status, headers, body) = self.dispatch(request, deadline, timeouts).await?;

        let mut reader = ChunkReader::new(body, deadline, timeouts);
        let mut buf = BytesMut::new();
        while let Some(chunk) = reader.next_chunk().await {
            let chunk = chunk?;
            if buf.len() + chunk.len() > self.config.max_body_size {
                return Err(TransportError::BodyTooLarge {
                    limit: self.config.max_body_size,
                });
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            status,
            headers,
            body: buf.freeze(),
        })
    }

    async fn send_streaming(
        &self,
        request: FunctionRequest,
        timeouts: Timeouts,
    ) -> Result<StreamingResponse, TransportError> {
        let deadline = Instant::now() + timeouts.request_timeout;
        let (status, headers, body) = self.dispatch(request, deadline, timeouts).await?;

        let reader = ChunkReader::new(body, deadline, timeouts);
        let chunks = futures_util::stream::unfold(reader, |mut reader| async move {
            reader.next_chunk().await.map(|chunk| (chunk, reader))
        });

        Ok(StreamingResponse {
            status,
            headers,
            chunks: Box::pin(chunks),
        })
    }
}

/// Pulls data frames off a hyper body under both timeout bounds.
struct ChunkReader {
    body: Incoming,
    deadline: Instant,
    timeouts: Timeouts,
    done: bool,
}

impl ChunkReader {
    fn new(body: Incoming, deadline: Instant, timeouts: Timeouts) -> Self {
        Self {
            body,
            deadline,
            timeouts,
            done: false,
        }
    }

    /// Next data chunk, or `None` once the body ends or an error was returned.
    async fn next_chunk(&mut self) -> Option<Result<Bytes, TransportError>> {
        while !self.done {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            let (wait, stage, after) = if remaining <= self.timeouts.receive_timeout {
                (remaining, TimeoutStage::Request, self.timeouts.request_timeout)
            } else {
                (
                    self.timeouts.receive_timeout,
                    TimeoutStage::Receive,
                    self.timeouts.receive_timeout,
                )
            };

            let frame = match tokio::time::timeout(wait, self.body.frame()).await {
                Err(_) => return Some(Err(self.fail(TransportError::Timeout { stage, after }))),
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Ok(Some(Err(e))) => return Some(Err(self.fail(TransportError::Stream(e.to_string())))),
                Ok(Some(Ok(frame))) => frame,
            };

            // Trailers carry no payload.
            if let Ok(data) = frame.into_data() {
                trace!("Received chunk of {} bytes", data.len());
                return Some(Ok(data));
            }
        }
        None
    }

    fn fail(&mut self, err: TransportError) -> TransportError {
        self.done = true;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::time::Duration;

    #[test]
    fn test_build_request_copies_headers_and_body() {
        let transport = HyperTransport::with_defaults();
        let request = FunctionRequest::new(Method::Post, "http://localhost:54321/functions/v1/hello")
            .header("Authorization", "Bearer token")
            .header("x-region", "eu-west-1")
            .body("payload");

        let req = transport.build_request(request).unwrap();
        assert_eq!(*req.method(), hyper::Method::POST);
        assert_eq!(req.uri().path(), "/functions/v1/hello");
        assert_eq!(req.headers()["authorization"], "Bearer token");
        assert_eq!(req.headers()["x-region"], "eu-west-1");
        assert!(req.headers()["user-agent"]
            .to_str()
            .unwrap()
            .starts_with("fezz-functions/"));
    }

    #[test]
    fn test_build_request_rejects_bad_header_value() {
        let transport = HyperTransport::with_defaults();
        let request = FunctionRequest::new(Method::Get, "http://localhost/functions/v1/hello")
            .header("x-bad", "line\nbreak");

        let err = transport.build_request(request).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_config_defaults() {
        let transport = HyperTransport::default();
        assert_eq!(transport.config().max_body_size, 10 * 1024 * 1024);
        assert_eq!(
            Duration::from_millis(15_000),
            Timeouts::default().request_timeout
        );
    }
}
