use super::core::{Codec, DecodeError};
use serde_json::Value;

/// Codec for homogeneous JSON arrays, see [`array`]
#[derive(Debug, Clone, Copy)]
pub struct Array<C> {
    element: C,
}

/// Codec for a JSON array whose elements are all mapped by `element`.
///
/// Unlike the object codecs, decoding does not stop at the first bad element: every
/// element is tried and all failures are reported together, each prefixed with its
/// index, e.g. `Error decoding element(s): [1] Expected number but got -> string`.
pub fn array<C: Codec>(element: C) -> Array<C> {
    Array { element }
}

impl<C: Codec> Codec for Array<C> {
    type Value = Vec<C::Value>;

    fn encode(&self, value: &Vec<C::Value>) -> Value {
        Value::Array(value.iter().map(|v| self.element.encode(v)).collect())
    }

    fn decode(&self, wire: &Value) -> Result<Vec<C::Value>, DecodeError> {
        let items = wire
            .as_array()
            .ok_or_else(|| DecodeError::expected("array", wire))?;

        let mut decoded = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.element.decode(item) {
                Ok(v) => decoded.push(v),
                Err(e) => errors.push(format!("[{index}] {e}")),
            }
        }

        if errors.is_empty() {
            Ok(decoded)
        } else {
            Err(DecodeError::new(format!(
                "Error decoding element(s): {}",
                errors.join(", ")
            )))
        }
    }

    fn is(&self, wire: &Value) -> bool {
        wire.as_array()
            .is_some_and(|items| items.iter().all(|i| self.element.is(i)))
    }
}
