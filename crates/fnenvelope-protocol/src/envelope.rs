use std::collections::BTreeMap;

use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Multi-valued header map as it appears on the wire.
///
/// Keys are sorted; values keep the order they had on the request.
pub type Headers = BTreeMap<String, Vec<String>>;

/// The JSON object written to the function's input stream.
///
/// Wire format:
/// ```text
/// {"body":"<string>","headers":{"<Name>":["<value>", ...], ...}}
/// ```
///
/// `body` is always present, `""` when the request had no body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub body: String,
    #[serde(default)]
    pub headers: Headers,
}

impl RequestEnvelope {
    /// Build an envelope from request headers and the fully read body.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn from_parts(headers: &HeaderMap, body: &[u8]) -> Self {
        Self {
            body: String::from_utf8_lossy(body).into_owned(),
            headers: header_values(headers),
        }
    }
}

/// The JSON object read back from the function's output stream.
///
/// Wire format:
/// ```text
/// {"headers":{...},"body":"<string>","status_code":<integer>}
/// ```
///
/// Only `body` is mandatory. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ResponseEnvelope {
    /// Create a response with an explicit status and no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            headers: None,
            body: body.into(),
            status_code: Some(status.as_u16()),
        }
    }

    /// Attach headers to the response.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// The status to replay, `200 OK` when the function did not assert one.
    pub fn status(&self) -> StatusCode {
        self.status_code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK)
    }

    /// Fill in the default status so the envelope records what was replayed.
    pub fn with_resolved_status(mut self) -> Self {
        self.status_code = Some(self.status().as_u16());
        self
    }

    /// Treat `status_code: 0` as absent and reject codes outside 100..=999.
    pub(crate) fn normalize(mut self) -> Result<Self, DecodeError> {
        match self.status_code {
            Some(0) => self.status_code = None,
            Some(code) if StatusCode::from_u16(code).is_err() => {
                return Err(DecodeError::InvalidStatus(code));
            }
            _ => {}
        }
        Ok(self)
    }
}

/// Collect request headers into the wire map, keyed by canonical name.
pub fn header_values(headers: &HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in headers {
        out.entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

/// Canonical MIME form of a header name: `x-request-id` -> `X-Request-Id`.
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use http::header::{ACCEPT, CONTENT_TYPE};
    use http::HeaderValue;

    use super::*;

    #[test]
    fn canonical_keys() {
        assert_eq!(canonical_header_key("content-type"), "Content-Type");
        assert_eq!(canonical_header_key("x-fn-call-id"), "X-Fn-Call-Id");
        assert_eq!(canonical_header_key("ETAG"), "Etag");
        assert_eq!(canonical_header_key("a--b"), "A--B");
    }

    #[test]
    fn header_values_keep_request_order() {
        let mut headers = HeaderMap::new();
        headers.append(ACCEPT, HeaderValue::from_static("text/plain"));
        headers.append(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.append(ACCEPT, HeaderValue::from_static("application/json"));

        let values = header_values(&headers);
        assert_eq!(values.len(), 2);
        assert_eq!(values["Accept"], vec!["text/plain", "application/json"]);
        assert_eq!(values["Content-Type"], vec!["application/json"]);
    }

    #[test]
    fn request_body_precedes_headers_on_the_wire() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let envelope = RequestEnvelope::from_parts(&headers, b"hi");

        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            json,
            r#"{"body":"hi","headers":{"Content-Type":["text/plain"]}}"#
        );
    }

    #[test]
    fn empty_request_still_has_body_field() {
        let envelope = RequestEnvelope::from_parts(&HeaderMap::new(), b"");
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"body":"","headers":{}}"#);
    }

    #[test]
    fn invalid_utf8_body_is_replaced() {
        let envelope = RequestEnvelope::from_parts(&HeaderMap::new(), &[b'o', 0xFF, b'k']);
        assert_eq!(envelope.body, "o\u{FFFD}k");
    }

    #[test]
    fn response_requires_body() {
        let err = serde_json::from_str::<ResponseEnvelope>(r#"{"status_code":200}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `body`"));
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"body":"ok","trace":{"span":1},"status_code":201}"#).unwrap();
        assert_eq!(envelope.body, "ok");
        assert_eq!(envelope.status(), StatusCode::CREATED);
        assert!(envelope.headers.is_none());
    }

    #[test]
    fn missing_status_defaults_to_ok() {
        let envelope: ResponseEnvelope = serde_json::from_str(r#"{"body":""}"#).unwrap();
        assert_eq!(envelope.status(), StatusCode::OK);
        assert_eq!(envelope.with_resolved_status().status_code, Some(200));
    }

    #[test]
    fn zero_status_is_absent() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"body":"","status_code":0}"#).unwrap();
        let envelope = envelope.normalize().unwrap();
        assert_eq!(envelope.status_code, None);
        assert_eq!(envelope.status(), StatusCode::OK);
    }

    #[test]
    fn out_of_range_status_is_rejected() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"body":"","status_code":1000}"#).unwrap();
        assert!(matches!(
            envelope.normalize(),
            Err(DecodeError::InvalidStatus(1000))
        ));
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let envelope = ResponseEnvelope {
            headers: None,
            body: "x".to_string(),
            status_code: None,
        };
        assert_eq!(serde_json::to_string(&envelope).unwrap(), r#"{"body":"x"}"#);
    }
}
