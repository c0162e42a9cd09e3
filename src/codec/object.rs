use super::core::{Codec, DecodeError};
use serde_json::{Map, Value};

/// A JSON object on the wire
pub type Object = Map<String, Value>;

/// A named field of an object codec.
///
/// Built with [`field`] and grouped into tuples that implement [`FieldSet`].
#[derive(Debug, Clone, Copy)]
pub struct Field<C> {
    key: &'static str,
    codec: C,
}

/// Declare an object field named `key` whose value is mapped by `codec`
pub fn field<C: Codec>(key: &'static str, codec: C) -> Field<C> {
    Field { key, codec }
}

impl<C: Codec> Field<C> {
    /// The object key this field reads and writes
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    fn encode_present(&self, value: &C::Value, out: &mut Object) {
        out.insert(self.key.to_owned(), self.codec.encode(value));
    }

    fn encode_if_present(&self, value: &Option<C::Value>, out: &mut Object) {
        if let Some(value) = value {
            self.encode_present(value, out);
        }
    }

    // A key that is present with a `null` value counts as present here; the field
    // codec decides whether `null` is acceptable.
    fn decode_present(&self, object: &Object) -> Result<C::Value, DecodeError> {
        let wire = object
            .get(self.key)
            .ok_or_else(|| DecodeError::missing_field(self.key))?;
        self.codec
            .decode(wire)
            .map_err(|e| DecodeError::in_field(self.key, &e))
    }

    fn decode_if_present(&self, object: &Object) -> Result<Option<C::Value>, DecodeError> {
        match object.get(self.key) {
            None | Some(Value::Null) => Ok(None),
            Some(wire) => self
                .codec
                .decode(wire)
                .map(Some)
                .map_err(|e| DecodeError::in_field(self.key, &e)),
        }
    }

    fn is_present(&self, object: &Object) -> bool {
        object.get(self.key).is_some_and(|w| self.codec.is(w))
    }

    fn is_if_present(&self, object: &Object) -> bool {
        match object.get(self.key) {
            None | Some(Value::Null) => true,
            Some(wire) => self.codec.is(wire),
        }
    }
}

/// An ordered group of fields, implemented for tuples of [`Field`]s.
///
/// The declaration order of the tuple is the scan order used by [`required`] and
/// [`optional`]. `Required` is the tuple of field values; `Optional` wraps each of them
/// in an `Option`.
pub trait FieldSet: Send + Sync {
    /// Decoded value when every field must be present
    type Required;
    /// Decoded value when any field may be absent
    type Optional;

    /// Keys in declaration order
    fn keys(&self) -> Vec<&'static str>;

    #[doc(hidden)]
    fn encode_required(&self, value: &Self::Required, out: &mut Object);
    #[doc(hidden)]
    fn decode_required(&self, object: &Object) -> Result<Self::Required, DecodeError>;
    #[doc(hidden)]
    fn is_required(&self, object: &Object) -> bool;
    #[doc(hidden)]
    fn encode_optional(&self, value: &Self::Optional, out: &mut Object);
    #[doc(hidden)]
    fn decode_optional(&self, object: &Object) -> Result<Self::Optional, DecodeError>;
    #[doc(hidden)]
    fn is_optional(&self, object: &Object) -> bool;
}

// Tuple expressions evaluate left to right, so `?` inside them stops at the first
// failing field in declaration order.
macro_rules! impl_field_set {
    ($($codec:ident : $idx:tt),+) => {
        impl<$($codec: Codec),+> FieldSet for ($(Field<$codec>,)+) {
            type Required = ($($codec::Value,)+);
            type Optional = ($(Option<$codec::Value>,)+);

            fn keys(&self) -> Vec<&'static str> {
                vec![$(self.$idx.key),+]
            }

            fn encode_required(&self, value: &Self::Required, out: &mut Object) {
                $(self.$idx.encode_present(&value.$idx, out);)+
            }

            fn decode_required(&self, object: &Object) -> Result<Self::Required, DecodeError> {
                Ok(($(self.$idx.decode_present(object)?,)+))
            }

            fn is_required(&self, object: &Object) -> bool {
                true $(&& self.$idx.is_present(object))+
            }

            fn encode_optional(&self, value: &Self::Optional, out: &mut Object) {
                $(self.$idx.encode_if_present(&value.$idx, out);)+
            }

            fn decode_optional(&self, object: &Object) -> Result<Self::Optional, DecodeError> {
                Ok(($(self.$idx.decode_if_present(object)?,)+))
            }

            fn is_optional(&self, object: &Object) -> bool {
                true $(&& self.$idx.is_if_present(object))+
            }
        }
    };
}

impl_field_set!(A: 0);
impl_field_set!(A: 0, B: 1);
impl_field_set!(A: 0, B: 1, C: 2);
impl_field_set!(A: 0, B: 1, C: 2, D: 3);
impl_field_set!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_field_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_field_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_field_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
impl_field_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
impl_field_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);

/// A codec whose wire form is always a JSON object.
///
/// Only object codecs can take part in an [`intersection`], which merges their
/// encoded objects key by key.
pub trait ObjectCodec: Codec {
    /// Encode into an object rather than a general wire value
    fn encode_object(&self, value: &Self::Value) -> Object;

    /// Decode from an object that has already been checked to be one
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] naming the first offending field.
    fn decode_object(&self, object: &Object) -> Result<Self::Value, DecodeError>;

    /// Type predicate over an object
    fn is_object(&self, object: &Object) -> bool;
}

fn as_object(wire: &Value) -> Result<&Object, DecodeError> {
    wire.as_object()
        .ok_or_else(|| DecodeError::expected("object", wire))
}

macro_rules! object_codec {
    ($ty:ident < $($param:ident),+ > = $val:ty, where $($bound:tt)+) => {
        impl<$($param),+> Codec for $ty<$($param),+> where $($bound)+ {
            type Value = $val;

            fn encode(&self, value: &Self::Value) -> Value {
                Value::Object(self.encode_object(value))
            }

            fn decode(&self, wire: &Value) -> Result<Self::Value, DecodeError> {
                self.decode_object(as_object(wire)?)
            }

            fn is(&self, wire: &Value) -> bool {
                wire.as_object().is_some_and(|o| self.is_object(o))
            }
        }
    };
}

/// Object codec whose fields must all be present, see [`required`]
#[derive(Debug, Clone, Copy)]
pub struct Required<F> {
    fields: F,
}

/// Object codec over a tuple of fields that must all be present.
///
/// Decoding scans the fields in declaration order and fails on the **first** field
/// that is missing (`Missing field(s): <key>`) or invalid
/// (`Error decoding field <key>: <message>`). Keys not covered by the codec are ignored.
pub fn required<F: FieldSet>(fields: F) -> Required<F> {
    Required { fields }
}

impl<F: FieldSet> Required<F> {
    /// Keys covered by this codec, in declaration order
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.keys()
    }
}

impl<F: FieldSet> ObjectCodec for Required<F> {
    fn encode_object(&self, value: &F::Required) -> Object {
        let mut out = Object::new();
        self.fields.encode_required(value, &mut out);
        out
    }

    fn decode_object(&self, object: &Object) -> Result<F::Required, DecodeError> {
        self.fields.decode_required(object)
    }

    fn is_object(&self, object: &Object) -> bool {
        self.fields.is_required(object)
    }
}

object_codec!(Required<F> = F::Required, where F: FieldSet);

/// Object codec whose fields may be absent, see [`optional`]
#[derive(Debug, Clone, Copy)]
pub struct Optional<F> {
    fields: F,
}

/// Object codec over a tuple of fields that may be absent.
///
/// Absent and `null` fields decode to `None` and are never an error; `None` fields are
/// omitted from the encoded object. A present field that fails its codec still fails
/// the whole decode, naming the field.
pub fn optional<F: FieldSet>(fields: F) -> Optional<F> {
    Optional { fields }
}

impl<F: FieldSet> Optional<F> {
    /// Keys covered by this codec, in declaration order
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.keys()
    }
}

impl<F: FieldSet> ObjectCodec for Optional<F> {
    fn encode_object(&self, value: &F::Optional) -> Object {
        let mut out = Object::new();
        self.fields.encode_optional(value, &mut out);
        out
    }

    fn decode_object(&self, object: &Object) -> Result<F::Optional, DecodeError> {
        self.fields.decode_optional(object)
    }

    fn is_object(&self, object: &Object) -> bool {
        self.fields.is_optional(object)
    }
}

object_codec!(Optional<F> = F::Optional, where F: FieldSet);

/// Merge of two object codecs, see [`intersection`]
#[derive(Debug, Clone, Copy)]
pub struct Intersection<L, R> {
    left: L,
    right: R,
}

/// Combine two object codecs into one that decodes to the pair of their values.
///
/// Decoding runs the left codec, then the right one, against the same object and fails
/// with the first error. Encoding shallow-merges both objects; on a key collision the
/// right-hand value wins.
pub fn intersection<L: ObjectCodec, R: ObjectCodec>(left: L, right: R) -> Intersection<L, R> {
    Intersection { left, right }
}

impl<L: ObjectCodec, R: ObjectCodec> ObjectCodec for Intersection<L, R> {
    fn encode_object(&self, value: &(L::Value, R::Value)) -> Object {
        let mut out = self.left.encode_object(&value.0);
        out.extend(self.right.encode_object(&value.1));
        out
    }

    fn decode_object(&self, object: &Object) -> Result<(L::Value, R::Value), DecodeError> {
        let left = self.left.decode_object(object)?;
        let right = self.right.decode_object(object)?;
        Ok((left, right))
    }

    fn is_object(&self, object: &Object) -> bool {
        self.left.is_object(object) && self.right.is_object(object)
    }
}

object_codec!(Intersection<L, R> = (L::Value, R::Value), where L: ObjectCodec, R: ObjectCodec);
