use super::core::{Codec, DecodeError};
use super::object::{Object, ObjectCodec};
use serde_json::Value;

/// A codec adapted to a domain type through a pair of conversions.
///
/// Built with [`CodecExt::map`]. The wire format is exactly that of the inner codec;
/// `into` runs after a successful decode and `from` runs before encoding.
pub struct Mapped<C: Codec, T> {
    inner: C,
    into: fn(C::Value) -> T,
    from: fn(&T) -> C::Value,
}

impl<C: Codec + Clone, T> Clone for Mapped<C, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            into: self.into,
            from: self.from,
        }
    }
}

impl<C: Codec + std::fmt::Debug, T> std::fmt::Debug for Mapped<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapped").field("inner", &self.inner).finish()
    }
}

/// Adapters available on every codec
pub trait CodecExt: Codec + Sized {
    /// Map this codec's value to a domain type.
    ///
    /// ```
    /// use edgeroute::codec::{field, required, string, Codec, CodecExt};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Name(String);
    ///
    /// let codec = required((field("name", string()),))
    ///     .map(|(n,)| Name(n), |Name(n)| (n.clone(),));
    /// let wire = serde_json::json!({"name": "Ada"});
    /// assert_eq!(codec.decode(&wire).unwrap(), Name("Ada".into()));
    /// assert_eq!(codec.encode(&Name("Ada".into())), wire);
    /// ```
    fn map<T>(self, into: fn(Self::Value) -> T, from: fn(&T) -> Self::Value) -> Mapped<Self, T> {
        Mapped {
            inner: self,
            into,
            from,
        }
    }
}

impl<C: Codec> CodecExt for C {}

impl<C: Codec, T> Codec for Mapped<C, T> {
    type Value = T;

    fn encode(&self, value: &T) -> Value {
        self.inner.encode(&(self.from)(value))
    }

    fn decode(&self, wire: &Value) -> Result<T, DecodeError> {
        self.inner.decode(wire).map(self.into)
    }

    fn is(&self, wire: &Value) -> bool {
        self.inner.is(wire)
    }
}

impl<C: ObjectCodec, T> ObjectCodec for Mapped<C, T> {
    fn encode_object(&self, value: &T) -> Object {
        self.inner.encode_object(&(self.from)(value))
    }

    fn decode_object(&self, object: &Object) -> Result<T, DecodeError> {
        self.inner.decode_object(object).map(self.into)
    }

    fn is_object(&self, object: &Object) -> bool {
        self.inner.is_object(object)
    }
}
