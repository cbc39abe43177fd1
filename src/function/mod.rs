//! Function invocation against a remote gateway.

pub mod client;
pub mod handler;
pub mod invoke;
pub mod options;

pub use client::Credentials;
pub use handler::{CollectBody, ResponseHandler};
pub use invoke::{decode_response, Functions, RELAY_ERROR_HEADER};
pub use options::{InvokeOptions, Region};
