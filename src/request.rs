//! # Request Module
//!
//! Inbound request type plus the helpers handlers use to pull typed input out of it.
//!
//! ## Overview
//!
//! The host hands the crate an already-parsed [`ApiRequest`]: method, absolute URL,
//! headers and an optional body. Nothing here performs transport I/O.
//!
//! - [`discriminate`] - pick a decode strategy from `Content-Type` and run a codec over the body
//! - [`get_path_params`] - read the version-stripped pathname, or only its last segment
//! - [`get_search_params`] - read one named query parameter
//!
//! All three report caller-input problems as [`DecodeError`]s; none of them panics.
//!
//! ## Example
//!
//! ```rust
//! use edgeroute::codec::{field, required, string};
//! use edgeroute::request::{discriminate, get_path_params, ApiRequest};
//! use http::Method;
//! use serde_json::json;
//!
//! let request = ApiRequest::new(Method::POST, "https://edge.test/v1/user/ada%40x.io")
//!     .unwrap()
//!     .with_json(&json!({ "email": "ada@x.io" }));
//!
//! let (email,) = discriminate(&required((field("email", string()),)), &request).unwrap();
//! assert_eq!(email, "ada@x.io");
//! assert_eq!(get_path_params(request.url(), "email", true).unwrap(), "ada@x.io");
//! ```

use crate::codec::{Codec, DecodeError};
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

/// Leading API version segment such as `/v1/`
static VERSION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/v\d+/").expect("version segment regex should be valid"));

/// An inbound request as handed over by the host.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a request without headers or body.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `url` is not an absolute URL.
    pub fn new(method: Method, url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::from_parts(method, Url::parse(url)?, HeaderMap::new(), None))
    }

    /// Assemble a request from already-parsed parts
    #[must_use]
    pub fn from_parts(method: Method, url: Url, headers: HeaderMap, body: Option<Vec<u8>>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// Add a header. Names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid request header"),
        }
        self
    }

    /// Set a raw body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and `Content-Type: application/json`
    #[must_use]
    pub fn with_json(mut self, body: &Value) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body.to_string().into_bytes());
        self
    }

    /// Add `Authorization: Bearer <token>`
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION.as_str(), &format!("Bearer {token}"))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL path without query string
    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("text/json")
}

/// Decode the request body with `codec`, choosing the strategy from `Content-Type`.
///
/// Only JSON bodies (`application/json` or `text/json`) are supported. Any other
/// content type fails with `Unsupported content type` before the body is looked at.
///
/// # Errors
///
/// Returns a [`DecodeError`] for an unsupported content type, an absent or malformed
/// JSON body, or a body that does not satisfy `codec`.
pub fn discriminate<C: Codec>(codec: &C, request: &ApiRequest) -> Result<C::Value, DecodeError> {
    let content_type = request.header(CONTENT_TYPE.as_str()).unwrap_or_default();
    if !is_json_content_type(content_type) {
        return Err(DecodeError::new("Unsupported content type"));
    }

    let body = request
        .body()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| DecodeError::new("Missing request body"))?;
    let wire: Value = serde_json::from_slice(body)
        .map_err(|e| DecodeError::new(format!("Invalid JSON body: {e}")))?;
    codec.decode(&wire)
}

/// Read the pathname of `url` with any leading `/v<digits>/` segment removed.
///
/// With `is_last` only the final path segment is returned. The result is
/// percent-decoded.
///
/// # Errors
///
/// Fails with `Error decoding pathname for key: <key>` when nothing is left to return.
pub fn get_path_params(url: &Url, key: &str, is_last: bool) -> Result<String, DecodeError> {
    let path = VERSION_SEGMENT.replace(url.path(), "/");
    let param = if is_last {
        path.rsplit('/').next().unwrap_or_default()
    } else {
        path.as_ref()
    };

    let decoded = urlencoding::decode(param)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| param.to_owned());
    if decoded.trim_matches('/').is_empty() {
        return Err(DecodeError::new(format!(
            "Error decoding pathname for key: {key}"
        )));
    }
    Ok(decoded)
}

/// Read the first value of query parameter `key`.
///
/// # Errors
///
/// Fails with `Missing param: <key>` when the parameter is absent or empty.
pub fn get_search_params(url: &Url, key: &str) -> Result<String, DecodeError> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DecodeError::new(format!("Missing param: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{field, number, required};
    use serde_json::json;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_unsupported_content_type_skips_body() {
        let request = ApiRequest::new(Method::POST, "https://edge.test/v1/user")
            .unwrap()
            .with_header("content-type", "text/plain")
            .with_body("{\"a\":1}");
        let err = discriminate(&number(), &request).unwrap_err();
        assert_eq!(err.message(), "Unsupported content type");

        let request = ApiRequest::new(Method::POST, "https://edge.test/v1/user").unwrap();
        let err = discriminate(&number(), &request).unwrap_err();
        assert_eq!(err.message(), "Unsupported content type");
    }

    #[test]
    fn test_text_json_is_accepted() {
        let request = ApiRequest::new(Method::POST, "https://edge.test/v1/n")
            .unwrap()
            .with_header("content-type", "text/json; charset=utf-8")
            .with_body("42");
        assert_eq!(discriminate(&number(), &request).unwrap(), 42.0);
    }

    #[test]
    fn test_malformed_or_missing_body_is_decode_error() {
        let codec = required((field("a", number()),));
        let request = ApiRequest::new(Method::POST, "https://edge.test/v1/n")
            .unwrap()
            .with_header("content-type", "application/json")
            .with_body("{oops");
        assert!(discriminate(&codec, &request)
            .unwrap_err()
            .message()
            .starts_with("Invalid JSON body"));

        let request = ApiRequest::new(Method::POST, "https://edge.test/v1/n")
            .unwrap()
            .with_header("content-type", "application/json");
        assert_eq!(
            discriminate(&codec, &request).unwrap_err().message(),
            "Missing request body"
        );
    }

    #[test]
    fn test_codec_errors_pass_through() {
        let codec = required((field("a", number()),));
        let request = ApiRequest::new(Method::POST, "https://edge.test/v1/n")
            .unwrap()
            .with_json(&json!({"b": 1}));
        assert_eq!(
            discriminate(&codec, &request).unwrap_err().message(),
            "Missing field(s): a"
        );
    }

    #[test]
    fn test_get_path_params_strips_version() {
        let u = url("https://edge.test/v1/user/ada%40x.io");
        assert_eq!(get_path_params(&u, "email", false).unwrap(), "/user/ada@x.io");
        assert_eq!(get_path_params(&u, "email", true).unwrap(), "ada@x.io");

        let u = url("https://edge.test/v12/file.txt?x=1");
        assert_eq!(get_path_params(&u, "file", true).unwrap(), "file.txt");
    }

    #[test]
    fn test_get_path_params_empty_is_error() {
        let u = url("https://edge.test/v1/user/");
        let err = get_path_params(&u, "email", true).unwrap_err();
        assert_eq!(err.message(), "Error decoding pathname for key: email");

        let u = url("https://edge.test/");
        assert!(get_path_params(&u, "any", false).is_err());
    }

    #[test]
    fn test_get_search_params() {
        let u = url("https://edge.test/v1/s?id=abc&empty=&id=def");
        assert_eq!(get_search_params(&u, "id").unwrap(), "abc");
        assert_eq!(
            get_search_params(&u, "empty").unwrap_err().message(),
            "Missing param: empty"
        );
        assert_eq!(
            get_search_params(&u, "nope").unwrap_err().message(),
            "Missing param: nope"
        );
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let request = ApiRequest::new(Method::GET, "https://edge.test/")
            .unwrap()
            .with_header("bad header", "x");
        assert!(request.headers().is_empty());
    }
}
