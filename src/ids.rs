//! ULID-backed identifiers.
//!
//! [`RequestId`] correlates log lines of one request (taken from `X-Request-Id` when the
//! caller sends a valid ULID). [`UserId`] is assigned to users at creation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
        pub struct $name(ulid::Ulid);

        impl $name {
            /// Generate a fresh identifier
            #[must_use]
            pub fn new() -> Self {
                Self(ulid::Ulid::new())
            }

            pub fn as_ulid(&self) -> ulid::Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                ulid::Ulid::from_string(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse()
                    .map_err(|_| serde::de::Error::custom(concat!("invalid ", $what, " id")))
            }
        }
    };
}

ulid_id!(
    /// Per-request correlation identifier
    RequestId,
    "request"
);

ulid_id!(
    /// Identifier of a stored user
    UserId,
    "user"
);

impl RequestId {
    /// Reuse the caller's id when it parses, otherwise generate one
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }
}
