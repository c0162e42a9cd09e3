use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;

/// Validation failure produced by [`Codec::decode`].
///
/// Carries a human-readable message only. Decode errors are caller-input problems and
/// are always returned explicitly; they never abort the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    /// Create a decode error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn expected(expected: &str, wire: &Value) -> Self {
        Self::new(format!("Expected {expected} but got -> {}", wire_type(wire)))
    }

    pub(crate) fn in_field(key: &str, inner: &DecodeError) -> Self {
        Self::new(format!("Error decoding field {key}: {}", inner.message))
    }

    pub(crate) fn missing_field(key: &str) -> Self {
        Self::new(format!("Missing field(s): {key}"))
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Name of the JSON type of a wire value, as used in decode messages
#[must_use]
pub fn wire_type(wire: &Value) -> &'static str {
    match wire {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Bidirectional mapping between a typed value and untyped wire data.
///
/// Implementations must uphold two laws:
///
/// 1. `is(w)` returning `true` implies `decode(w)` succeeds with an equivalent value.
/// 2. `decode(&encode(v))` succeeds and reconstructs every field of `v` the codec covers.
///
/// Codecs are immutable and shared freely between concurrent requests.
pub trait Codec: Send + Sync {
    /// The domain type this codec maps
    type Value;

    /// Encode a typed value into wire data
    fn encode(&self, value: &Self::Value) -> Value;

    /// Validate wire data and produce a typed value
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] naming the offending field or element when the wire data
    /// does not have the expected shape.
    fn decode(&self, wire: &Value) -> Result<Self::Value, DecodeError>;

    /// Type predicate over wire data
    fn is(&self, wire: &Value) -> bool;
}

impl<C: Codec + ?Sized> Codec for &C {
    type Value = C::Value;

    fn encode(&self, value: &Self::Value) -> Value {
        (**self).encode(value)
    }

    fn decode(&self, wire: &Value) -> Result<Self::Value, DecodeError> {
        (**self).decode(wire)
    }

    fn is(&self, wire: &Value) -> bool {
        (**self).is(wire)
    }
}

/// Codec for JSON strings
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

/// Codec for JSON strings
#[must_use]
pub fn string() -> StringCodec {
    StringCodec
}

impl Codec for StringCodec {
    type Value = String;

    fn encode(&self, value: &String) -> Value {
        Value::String(value.clone())
    }

    fn decode(&self, wire: &Value) -> Result<String, DecodeError> {
        match wire {
            Value::String(s) => Ok(s.clone()),
            other => Err(DecodeError::expected("string", other)),
        }
    }

    fn is(&self, wire: &Value) -> bool {
        wire.is_string()
    }
}

/// Codec for JSON numbers as `f64`
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberCodec;

/// Codec for JSON numbers as `f64`
#[must_use]
pub fn number() -> NumberCodec {
    NumberCodec
}

impl Codec for NumberCodec {
    type Value = f64;

    // Non-finite values have no JSON representation and encode as `null`.
    fn encode(&self, value: &f64) -> Value {
        serde_json::Number::from_f64(*value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn decode(&self, wire: &Value) -> Result<f64, DecodeError> {
        wire.as_f64()
            .ok_or_else(|| DecodeError::expected("number", wire))
    }

    fn is(&self, wire: &Value) -> bool {
        wire.as_f64().is_some()
    }
}

/// Codec for JSON numbers without a fractional part, as `i64`
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodec;

/// Codec for JSON numbers without a fractional part, as `i64`
#[must_use]
pub fn integer() -> IntegerCodec {
    IntegerCodec
}

impl Codec for IntegerCodec {
    type Value = i64;

    fn encode(&self, value: &i64) -> Value {
        Value::from(*value)
    }

    fn decode(&self, wire: &Value) -> Result<i64, DecodeError> {
        wire.as_i64()
            .ok_or_else(|| DecodeError::expected("integer", wire))
    }

    fn is(&self, wire: &Value) -> bool {
        wire.as_i64().is_some()
    }
}

/// Codec for JSON booleans
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCodec;

/// Codec for JSON booleans
#[must_use]
pub fn boolean() -> BooleanCodec {
    BooleanCodec
}

impl Codec for BooleanCodec {
    type Value = bool;

    fn encode(&self, value: &bool) -> Value {
        Value::Bool(*value)
    }

    fn decode(&self, wire: &Value) -> Result<bool, DecodeError> {
        wire.as_bool()
            .ok_or_else(|| DecodeError::expected("boolean", wire))
    }

    fn is(&self, wire: &Value) -> bool {
        wire.is_boolean()
    }
}

/// Codec for instants in time.
///
/// Encodes as an RFC 3339 string with millisecond precision (`2024-01-02T03:04:05.678Z`).
/// Decodes from an RFC 3339 string or from a number of milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateCodec;

/// Codec for instants in time, see [`DateCodec`]
#[must_use]
pub fn date() -> DateCodec {
    DateCodec
}

impl Codec for DateCodec {
    type Value = DateTime<Utc>;

    fn encode(&self, value: &DateTime<Utc>) -> Value {
        Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    fn decode(&self, wire: &Value) -> Result<DateTime<Utc>, DecodeError> {
        match wire {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| DecodeError::new(format!("Expected valid date but got -> {s}"))),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| DecodeError::new(format!("Expected valid date but got -> {n}"))),
            other => Err(DecodeError::expected("date", other)),
        }
    }

    fn is(&self, wire: &Value) -> bool {
        self.decode(wire).is_ok()
    }
}
