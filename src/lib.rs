//! # Fezz Functions - Gateway Invocation Client
//!
//! Client-side helper for invoking functions hosted behind a Fezz-style
//! serverless gateway. Given a function name and a set of options it builds
//! an HTTP request, sends it through a pluggable [`Transport`], and decodes
//! the response by its declared content type.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────────┐   ┌────────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Request       │──▶│ Content-Type   │──▶│ Transport  │──▶│ Response     │
//! │ Builder       │   │ Resolver       │   │ Invoker    │   │ Finalizer    │
//! └───────────────┘   └────────────────┘   └────────────┘   └──────────────┘
//!  url, method,        text/plain,          buffered or      JSON decode,
//!  auth, region        octet-stream, json   streaming        x-relay-error
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fezz_functions::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FunctionsError> {
//!     let credentials = Credentials::new("http://localhost:54321", "anon-key", "anon-key");
//!     let functions = Functions::with_hyper(credentials);
//!
//!     let options = InvokeOptions::new()
//!         .region(Region::EuWest1)
//!         .body(json!({"name": "Fezz"}));
//!
//!     let response = functions.invoke("hello", options).await?;
//!     println!("{:?}", response.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! [`Functions::invoke_streaming`] hands the status, headers and a one-shot
//! chunk stream to a [`ResponseHandler`]. The handler's result is returned
//! as-is: no decoding and no relay-error check happen on this path.
//!
//! ## Errors
//!
//! Every failure is a [`FunctionsError`] from the `functions` service. The
//! first failing stage ends the invocation. Nothing is retried.

pub mod error;
pub mod function;
pub mod http;
pub mod transport;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{ErrorKind, FunctionsError, TransportError};
    pub use crate::function::{
        CollectBody, Credentials, Functions, InvokeOptions, Region, ResponseHandler,
    };
    pub use crate::http::{Body, FunctionResponse, Headers, Method, ResponseBody, StatusCode};
    pub use crate::transport::{ChunkStream, HyperTransport, Timeouts, Transport};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use error::{ErrorKind, FunctionsError, TransportError};
pub use function::{Credentials, Functions, InvokeOptions, Region, ResponseHandler};
pub use http::{Body, FunctionRequest, FunctionResponse, Headers, Method, ResponseBody, StatusCode};
pub use transport::{HyperTransport, Timeouts, Transport, TransportConfig};
