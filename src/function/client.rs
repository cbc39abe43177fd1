//! Client credentials.

use crate::error::FunctionsError;
use crate::http::Headers;
use serde::{Deserialize, Serialize};
use url::Url;

/// Immutable credentials used to reach the gateway.
///
/// There are no setters: [`update_auth`](Self::update_auth) returns a new
/// value and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    base_url: String,
    api_key: String,
    access_token: String,
    /// Headers sent on every invocation before any per-call header.
    #[serde(default)]
    global_headers: Headers,
}

impl Credentials {
    /// Create credentials.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: access_token.into(),
            global_headers: Headers::new(),
        }
    }

    /// Load credentials from `FUNCTIONS_URL`, `FUNCTIONS_API_KEY` and
    /// `FUNCTIONS_ACCESS_TOKEN`. The access token defaults to the API key.
    pub fn from_env() -> Result<Self, FunctionsError> {
        let var = |key: &str| {
            std::env::var(key)
                .map_err(|_| FunctionsError::invalid_argument(format!("{} is not set", key)))
        };

        let base_url = var("FUNCTIONS_URL")?;
        let api_key = var("FUNCTIONS_API_KEY")?;
        let access_token = var("FUNCTIONS_ACCESS_TOKEN").unwrap_or_else(|_| api_key.clone());
        Ok(Self::new(base_url, api_key, access_token))
    }

    /// Return a copy carrying a global header.
    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.global_headers.insert(key, value);
        self
    }

    /// Return a copy with the bearer token replaced.
    pub fn update_auth(&self, token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn global_headers(&self) -> &Headers {
        &self.global_headers
    }

    /// URL of `{base_url}/functions/v1/{name}` with `name` encoded as a
    /// single path segment.
    pub fn function_url(&self, name: &str) -> Result<Url, FunctionsError> {
        if name.is_empty() {
            return Err(FunctionsError::invalid_argument("function name must not be empty"));
        }
        if name == "." || name == ".." {
            return Err(FunctionsError::invalid_argument(format!(
                "'{}' is not a valid function name",
                name
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            FunctionsError::invalid_argument(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                FunctionsError::invalid_argument(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["functions", "v1", name]);

        Ok(url)
    }
}
