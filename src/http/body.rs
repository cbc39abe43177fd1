//! Request bodies and outbound content-type inference.

use bytes::Bytes;
use serde::Serialize;

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_JSON: &str = "application/json";

/// Payload of a function invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Raw bytes, sent unchanged.
    Bytes(Bytes),
    /// Text, sent as its UTF-8 bytes.
    Text(String),
    /// Structured value, serialized to JSON before sending.
    Json(serde_json::Value),
}

impl Body {
    /// Build a structured body from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Body::Json)
    }

    /// Content type inferred from the body's shape.
    pub fn content_type(&self) -> &'static str {
        resolve_content_type(self)
    }

    /// Encode the body into the bytes put on the wire.
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        match self {
            Body::Bytes(bytes) => Ok(bytes.clone()),
            Body::Text(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Body::Json(value) => serde_json::to_vec(value).map(Bytes::from),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes.into())
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Body::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

/// Decide the outbound `Content-Type` for a body.
///
/// Byte and text bodies are `text/plain` when printable and
/// `application/octet-stream` otherwise. The printability check scans the
/// whole payload.
pub fn resolve_content_type(body: &Body) -> &'static str {
    match body {
        Body::Bytes(bytes) => classify(bytes),
        Body::Text(text) => classify(text.as_bytes()),
        Body::Json(_) => APPLICATION_JSON,
    }
}

fn classify(bytes: &[u8]) -> &'static str {
    if is_printable(bytes) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

/// Returns true if `bytes` is valid UTF-8 made only of printable characters.
///
/// Newline, carriage return, tab, vertical tab, backspace, form feed, escape
/// and bell count as printable.
pub fn is_printable(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.chars().all(|c| {
            !c.is_control()
                || matches!(
                    c,
                    '\n' | '\r' | '\t' | '\u{0B}' | '\u{08}' | '\u{0C}' | '\u{1B}' | '\u{07}'
                )
        }),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_printable_text() {
        assert_eq!(resolve_content_type(&Body::from("Hello, World!")), TEXT_PLAIN);
        assert_eq!(resolve_content_type(&Body::from("línea\n\ttab")), TEXT_PLAIN);
        assert_eq!(resolve_content_type(&Body::from(Vec::new())), TEXT_PLAIN);
    }

    #[test]
    fn test_binary_bytes() {
        assert_eq!(resolve_content_type(&Body::from(vec![0xff, 0xfe, 0x00])), OCTET_STREAM);
        assert_eq!(resolve_content_type(&Body::from("nul\0inside")), OCTET_STREAM);
    }

    #[test]
    fn test_structured_value() {
        let body = Body::from(json!({"name": "fezz"}));
        assert_eq!(body.content_type(), APPLICATION_JSON);

        let encoded = body.encode().unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, json!({"name": "fezz"}));
    }

    #[test]
    fn test_binary_sent_unchanged() {
        let raw = vec![0u8, 159, 146, 150, 255];
        let encoded = Body::from(raw.clone()).encode().unwrap();
        assert_eq!(encoded.as_ref(), raw.as_slice());
    }

    #[test]
    fn test_body_from_serializable() {
        #[derive(serde::Serialize)]
        struct Payload {
            count: u32,
        }

        let body = Body::json(&Payload { count: 3 }).unwrap();
        assert_eq!(body, Body::Json(json!({"count": 3})));
    }
}
