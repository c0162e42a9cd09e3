//! # Response Module
//!
//! Outbound response type and the envelope constructors used by handlers.
//!
//! Envelope responses always carry `Content-Type: application/json` and a body of
//! exactly one of `{"data": ...}` or `{"error": "..."}`. Data responses default to
//! `200 OK`, error responses to `500 Internal Server Error`; both can be overridden
//! with [`ApiResponse::with_status`].

use crate::codec::{serialize, Codec, Envelope};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};

/// An outbound response handed back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Create a response with the given status, no headers and an empty body
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Plain-text response
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_content_type("text/plain")
            .with_body(body.into().into_bytes())
    }

    /// Replace the status code
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header. Names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid response header"),
        }
        self
    }

    /// Set `Content-Type`
    #[must_use]
    pub fn with_content_type(self, content_type: &str) -> Self {
        self.with_header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, lossily converted
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON, if it is JSON
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

fn envelope_response<C: Codec>(codec: &C, envelope: &Envelope<C::Value>, status: StatusCode) -> ApiResponse {
    ApiResponse::new(status)
        .with_content_type("application/json")
        .with_body(serialize(codec, envelope).into_bytes())
}

/// `200 {"data": <encoded value>}`
pub fn data_response<C: Codec>(codec: &C, value: C::Value) -> ApiResponse {
    envelope_response(codec, &Envelope::Data(value), StatusCode::OK)
}

/// `500 {"error": <message>}`
pub fn error_response(message: impl Into<String>) -> ApiResponse {
    // The payload codec is irrelevant for the error arm.
    envelope_response(
        &crate::codec::string(),
        &Envelope::Error(message.into()),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}
