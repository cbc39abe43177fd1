//! Function invocation: build, send, decode.

use crate::error::FunctionsError;
use crate::function::client::Credentials;
use crate::function::handler::ResponseHandler;
use crate::function::options::InvokeOptions;
use crate::http::body::{APPLICATION_JSON, TEXT_PLAIN};
use crate::http::{FunctionRequest, FunctionResponse, Headers, RawResponse, ResponseBody};
use crate::transport::{HyperTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Response header the gateway sets when the function failed upstream.
pub const RELAY_ERROR_HEADER: &str = "x-relay-error";

/// Entry point for invoking functions on a gateway.
///
/// Holds immutable [`Credentials`] and a shared [`Transport`]. Every call
/// builds its own request, so one value can serve concurrent invocations.
#[derive(Clone)]
pub struct Functions {
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl Functions {
    /// Create a client using the given transport.
    pub fn new(credentials: Credentials, transport: impl Transport + 'static) -> Self {
        Self::with_transport(credentials, Arc::new(transport))
    }

    /// Create a client sharing an existing transport.
    pub fn with_transport(credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    /// Create a client on the default hyper transport.
    pub fn with_hyper(credentials: Credentials) -> Self {
        Self::new(credentials, HyperTransport::with_defaults())
    }

    /// Get the credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Return a client whose credentials carry `token`. `self` is unchanged.
    pub fn update_auth(&self, token: impl Into<String>) -> Self {
        Self {
            credentials: self.credentials.update_auth(token),
            transport: self.transport.clone(),
        }
    }

    /// Assemble the request descriptor for invoking `name`.
    pub fn build_request(
        &self,
        name: &str,
        options: &InvokeOptions,
    ) -> Result<FunctionRequest, FunctionsError> {
        let url = self.credentials.function_url(name)?;

        if options.timeout == Some(Duration::ZERO) {
            return Err(FunctionsError::invalid_argument("timeout must be positive"));
        }

        let token = options
            .auth_override()
            .unwrap_or_else(|| self.credentials.access_token());

        let mut headers = Headers::new();
        headers.merge(self.credentials.global_headers());
        headers.insert("apikey", self.credentials.api_key());
        headers.insert("authorization", format!("Bearer {}", token));

        if let Some(region) = options.region.as_ref().and_then(|r| r.header_value()) {
            headers.insert("x-region", region);
        }

        let body = match &options.body {
            Some(body) => {
                headers.insert("content-type", body.content_type());
                Some(body.encode().map_err(FunctionsError::Serialize)?)
            }
            None => None,
        };

        headers.merge(&options.headers);

        Ok(FunctionRequest {
            method: options.method,
            url: url.into(),
            headers,
            body,
            decode_body: false,
        })
    }

    /// Invoke `name` and decode the buffered response.
    ///
    /// JSON responses are parsed; anything else is returned as raw bytes.
    /// A response carrying `x-relay-error: true` becomes
    /// [`FunctionsError::Relay`].
    pub async fn invoke(
        &self,
        name: &str,
        options: InvokeOptions,
    ) -> Result<FunctionResponse, FunctionsError> {
        let request = self.build_request(name, &options)?;
        let timeouts = options.timeouts();

        debug!("Invoking function '{}' ({})", name, request.method);
        let raw = self.transport.send(request, timeouts).await?;
        decode_response(raw)
    }

    /// Invoke `name` and hand the streamed response to `handler`.
    ///
    /// The handler's result is returned verbatim.
    pub async fn invoke_streaming<H: ResponseHandler>(
        &self,
        name: &str,
        options: InvokeOptions,
        handler: H,
    ) -> Result<H::Output, FunctionsError> {
        let request = self.build_request(name, &options)?;
        let timeouts = options.timeouts();

        debug!("Invoking function '{}' ({}, streaming)", name, request.method);
        let response = self.transport.send_streaming(request, timeouts).await?;
        handler
            .receive(response.status, response.headers, response.chunks)
            .await
    }
}

impl std::fmt::Debug for Functions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Functions")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Decode a buffered response by its content type, then check for a relay
/// failure.
pub fn decode_response(raw: RawResponse) -> Result<FunctionResponse, FunctionsError> {
    let content_type = raw.headers.get("content-type").unwrap_or(TEXT_PLAIN);

    let body = if media_type(content_type).eq_ignore_ascii_case(APPLICATION_JSON) {
        match serde_json::from_slice(&raw.body) {
            Ok(value) => ResponseBody::Json(value),
            Err(source) => {
                return Err(FunctionsError::Decode {
                    content_type: content_type.to_string(),
                    body: raw.body,
                    source,
                })
            }
        }
    } else {
        ResponseBody::Raw(raw.body)
    };

    let response = FunctionResponse {
        status: raw.status,
        headers: raw.headers,
        body,
    };

    if response.get_header(RELAY_ERROR_HEADER) == Some("true") {
        return Err(FunctionsError::Relay {
            response: Box::new(response),
        });
    }

    Ok(response)
}

/// Media type without parameters, e.g. `application/json; charset=utf-8`
/// becomes `application/json`.
fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}
