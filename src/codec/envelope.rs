use super::core::{Codec, DecodeError};
use serde_json::{Map, Value};

/// The response envelope: exactly one of `{"data": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<A> {
    /// Successful payload, encoded with the route's codec
    Data(A),
    /// Human-readable error message
    Error(String),
}

/// Render an envelope as JSON text, encoding `data` payloads with `codec`
pub fn serialize<C: Codec>(codec: &C, envelope: &Envelope<C::Value>) -> String {
    let mut out = Map::with_capacity(1);
    match envelope {
        Envelope::Data(value) => {
            out.insert("data".to_owned(), codec.encode(value));
        }
        Envelope::Error(message) => {
            out.insert("error".to_owned(), Value::String(message.clone()));
        }
    }
    Value::Object(out).to_string()
}

/// Parse JSON text and decode it with `codec`.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the text is not valid JSON or does not satisfy `codec`.
pub fn deserialize<C: Codec>(codec: &C, text: &str) -> Result<C::Value, DecodeError> {
    let wire: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::new(format!("Invalid JSON: {e}")))?;
    codec.decode(&wire)
}

/// Decode an envelope previously produced by [`serialize`].
///
/// # Errors
///
/// Fails when the wire value is not an object holding exactly one of `data` or `error`,
/// or when the `data` payload does not satisfy `codec`.
pub fn decode_envelope<C: Codec>(codec: &C, wire: &Value) -> Result<Envelope<C::Value>, DecodeError> {
    let object = wire
        .as_object()
        .ok_or_else(|| DecodeError::expected("object", wire))?;
    match (object.get("data"), object.get("error")) {
        (Some(data), None) => codec
            .decode(data)
            .map(Envelope::Data)
            .map_err(|e| DecodeError::in_field("data", &e)),
        (None, Some(Value::String(message))) => Ok(Envelope::Error(message.clone())),
        (None, Some(other)) => Err(DecodeError::in_field(
            "error",
            &DecodeError::expected("string", other),
        )),
        (Some(_), Some(_)) => Err(DecodeError::new(
            "Envelope must carry exactly one of data or error",
        )),
        (None, None) => Err(DecodeError::missing_field("data")),
    }
}
