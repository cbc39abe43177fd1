//! Per-invocation options.

use crate::error::FunctionsError;
use crate::http::{Body, Headers, Method};
use crate::transport::{Timeouts, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Gateway region an invocation should run in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Let the gateway pick. No `x-region` header is sent.
    #[default]
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "ap-northeast-1")]
    ApNortheast1,
    #[serde(rename = "ap-northeast-2")]
    ApNortheast2,
    #[serde(rename = "ap-south-1")]
    ApSouth1,
    #[serde(rename = "ap-southeast-1")]
    ApSoutheast1,
    #[serde(rename = "ap-southeast-2")]
    ApSoutheast2,
    #[serde(rename = "ca-central-1")]
    CaCentral1,
    #[serde(rename = "eu-central-1")]
    EuCentral1,
    #[serde(rename = "eu-west-1")]
    EuWest1,
    #[serde(rename = "eu-west-2")]
    EuWest2,
    #[serde(rename = "eu-west-3")]
    EuWest3,
    #[serde(rename = "sa-east-1")]
    SaEast1,
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "us-west-1")]
    UsWest1,
    #[serde(rename = "us-west-2")]
    UsWest2,
}

impl Region {
    pub const ALL: [Region; 15] = [
        Region::Any,
        Region::ApNortheast1,
        Region::ApNortheast2,
        Region::ApSouth1,
        Region::ApSoutheast1,
        Region::ApSoutheast2,
        Region::CaCentral1,
        Region::EuCentral1,
        Region::EuWest1,
        Region::EuWest2,
        Region::EuWest3,
        Region::SaEast1,
        Region::UsEast1,
        Region::UsWest1,
        Region::UsWest2,
    ];

    /// Region tag as sent in `x-region`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Any => "any",
            Region::ApNortheast1 => "ap-northeast-1",
            Region::ApNortheast2 => "ap-northeast-2",
            Region::ApSouth1 => "ap-south-1",
            Region::ApSoutheast1 => "ap-southeast-1",
            Region::ApSoutheast2 => "ap-southeast-2",
            Region::CaCentral1 => "ca-central-1",
            Region::EuCentral1 => "eu-central-1",
            Region::EuWest1 => "eu-west-1",
            Region::EuWest2 => "eu-west-2",
            Region::EuWest3 => "eu-west-3",
            Region::SaEast1 => "sa-east-1",
            Region::UsEast1 => "us-east-1",
            Region::UsWest1 => "us-west-1",
            Region::UsWest2 => "us-west-2",
        }
    }

    /// Header value to send, or `None` for [`Region::Any`].
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            Region::Any => None,
            other => Some(other.as_str()),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = FunctionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FunctionsError::invalid_argument(format!("unknown region '{}'", s)))
    }
}

/// Options for a single invocation.
///
/// ```rust
/// use fezz_functions::{InvokeOptions, Method, Region};
/// use std::time::Duration;
///
/// let options = InvokeOptions::new()
///     .method(Method::Put)
///     .region(Region::EuWest1)
///     .header("x-trace", "abc")
///     .timeout(Duration::from_secs(5))
///     .body("hello");
/// assert_eq!(options.timeouts().request_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeOptions {
    /// Request payload.
    pub body: Option<Body>,
    /// Caller headers, applied last.
    pub headers: Headers,
    /// HTTP method. Defaults to POST.
    pub method: Method,
    /// Target region.
    pub region: Option<Region>,
    /// Bound for each chunk and for the whole exchange.
    pub timeout: Option<Duration>,
    /// Bearer token used for this call only. Empty means no override.
    pub auth: Option<String>,
}

impl InvokeOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a structured body from any serializable value.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FunctionsError> {
        self.body = Some(Body::json(value).map_err(FunctionsError::Serialize)?);
        Ok(self)
    }

    /// Add a header, replacing any earlier value for the same name.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the target region.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the bearer token for this call.
    pub fn auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }

    /// Timeout bounds handed to the transport.
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::uniform(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Bearer token override, if one is set and non-empty.
    pub(crate) fn auth_override(&self) -> Option<&str> {
        self.auth.as_deref().filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_tags() {
        assert_eq!(Region::UsEast1.as_str(), "us-east-1");
        assert_eq!(Region::Any.header_value(), None);
        assert_eq!(Region::EuWest3.header_value(), Some("eu-west-3"));
    }

    #[test]
    fn test_region_parse() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
        assert!("mars-north-1".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_serde_uses_tags() {
        let json = serde_json::to_string(&Region::ApSoutheast2).unwrap();
        assert_eq!(json, r#""ap-southeast-2""#);
    }

    #[test]
    fn test_defaults() {
        let options = InvokeOptions::new();
        assert_eq!(options.method, Method::Post);
        assert_eq!(options.timeouts(), Timeouts::uniform(Duration::from_millis(15_000)));
        assert_eq!(options.auth_override(), None);
    }

    #[test]
    fn test_explicit_timeout_sets_both_bounds() {
        let timeouts = InvokeOptions::new()
            .timeout(Duration::from_millis(5000))
            .timeouts();
        assert_eq!(timeouts.receive_timeout, Duration::from_millis(5000));
        assert_eq!(timeouts.request_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_empty_auth_is_ignored() {
        assert_eq!(InvokeOptions::new().auth("").auth_override(), None);
        assert_eq!(InvokeOptions::new().auth("t").auth_override(), Some("t"));
    }
}
