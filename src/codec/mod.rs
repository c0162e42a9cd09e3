//! # Codec Module
//!
//! The codec module provides typed, bidirectional mapping between domain values and
//! untyped wire data ([`serde_json::Value`]). Every codec implements three operations:
//!
//! - **`encode`** - turn a typed value into wire data
//! - **`decode`** - validate wire data and produce a typed value, or a [`DecodeError`]
//! - **`is`** - a cheap predicate: `is(w)` holding implies `decode(w)` succeeds
//!
//! ## Overview
//!
//! Codecs are plain immutable values. Primitive codecs ([`string`], [`number`],
//! [`integer`], [`boolean`], [`date`]) are combined structurally:
//!
//! - [`required`] - object codec over a tuple of [`field`]s; every field must be present
//! - [`optional`] - object codec whose fields may be absent or `null`
//! - [`intersection`] - merges two object codecs into one
//! - [`array`] - homogeneous sequences, accumulating every element error
//! - [`CodecExt::map`] - adapts a codec to a named domain type
//!
//! Composition is checked statically: a `required` codec over
//! `(field("name", string()), field("age", number()))` decodes to `(String, f64)`,
//! and [`intersection`] only accepts codecs that encode to JSON objects.
//!
//! ## Example
//!
//! ```rust
//! use edgeroute::codec::{field, intersection, number, optional, required, string, Codec};
//! use serde_json::json;
//!
//! let person = intersection(
//!     required((field("name", string()),)),
//!     optional((field("age", number()),)),
//! );
//!
//! let decoded = person.decode(&json!({ "name": "Ada" })).unwrap();
//! assert_eq!(decoded, (("Ada".to_string(),), (None,)));
//!
//! let err = person.decode(&json!({ "name": 1 })).unwrap_err();
//! assert_eq!(err.message(), "Error decoding field name: Expected string but got -> number");
//! ```
//!
//! ## Failure Semantics
//!
//! - Object codecs are **fail-fast**: the first missing or invalid field in declaration
//!   order ends the scan and is reported by name.
//! - [`array`] is **accumulating**: every offending element is reported, by index.
//! - Messages are human-readable strings; there are no structured error trees.

mod array;
mod core;
mod envelope;
mod map;
mod object;
#[cfg(test)]
mod tests;

pub use array::{array, Array};
pub use self::core::{
    boolean, date, integer, number, string, wire_type, BooleanCodec, Codec, DateCodec,
    DecodeError, IntegerCodec, NumberCodec, StringCodec,
};
pub use envelope::{decode_envelope, deserialize, serialize, Envelope};
pub use map::{CodecExt, Mapped};
pub use object::{
    field, intersection, optional, required, Field, FieldSet, Intersection, Object, ObjectCodec,
    Optional, Required,
};
