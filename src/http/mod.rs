//! HTTP types shared by the invocation pipeline and transports.

pub mod body;
mod headers;
mod request;
mod response;

pub use body::{is_printable, resolve_content_type, Body};
pub use headers::Headers;
pub use request::{FunctionRequest, Method};
pub use response::{FunctionResponse, RawResponse, ResponseBody, StatusCode};
