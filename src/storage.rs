//! # Storage Module
//!
//! Durable per-key record storage consumed by the user routes.
//!
//! Records are stored as encoded wire values under opaque string keys. The typed
//! helpers [`load`] and [`store`] run a [`Codec`] on the way in and out, so a record
//! that no longer satisfies its codec surfaces as [`StoreError::Corrupt`] instead of
//! a half-read value.
//!
//! [`MemoryStore`] is a lock-free in-process implementation backed by `dashmap`; hosts
//! with a real database provide their own [`KeyValueStore`].

use crate::codec::Codec;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{self, BoxFuture};
use serde_json::Value;
use std::fmt;

/// Storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation
    Unavailable(String),
    /// A stored record does not decode with the expected codec
    Corrupt { key: String, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(m) => write!(f, "store unavailable: {m}"),
            StoreError::Corrupt { key, message } => {
                write!(f, "corrupt record at {key}: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Get/put of encoded records by key.
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>>;

    fn put<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Store `value` only if `key` is vacant; resolves to whether it was stored
    fn put_if_absent<'a>(
        &'a self,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, Result<bool, StoreError>>;

    /// Remove `key`; resolves to whether a record was removed
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, StoreError>>;
}

/// Read and decode the record at `key`.
///
/// # Errors
///
/// Propagates store failures; a record that fails `codec` is [`StoreError::Corrupt`].
pub async fn load<C: Codec>(
    store: &dyn KeyValueStore,
    codec: &C,
    key: &str,
) -> Result<Option<C::Value>, StoreError> {
    match store.get(key).await? {
        None => Ok(None),
        Some(wire) => codec.decode(&wire).map(Some).map_err(|e| StoreError::Corrupt {
            key: key.to_owned(),
            message: e.to_string(),
        }),
    }
}

/// Encode `value` and store it at `key` if the key is vacant.
///
/// # Errors
///
/// Propagates store failures.
pub async fn store<C: Codec>(
    store: &dyn KeyValueStore,
    codec: &C,
    key: &str,
    value: &C::Value,
) -> Result<bool, StoreError> {
    store.put_if_absent(key, codec.encode(value)).await
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        let value = self.records.get(key).map(|r| r.value().clone());
        Box::pin(future::ready(Ok(value)))
    }

    fn put<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        self.records.insert(key.to_owned(), value);
        Box::pin(future::ready(Ok(())))
    }

    fn put_if_absent<'a>(
        &'a self,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        let stored = match self.records.entry(key.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        };
        Box::pin(future::ready(Ok(stored)))
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
        let removed = self.records.remove(key).is_some();
        Box::pin(future::ready(Ok(removed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{field, required, string};
    use serde_json::json;

    #[tokio::test]
    async fn test_put_if_absent_keeps_first_value() {
        let s = MemoryStore::new();
        assert!(s.put_if_absent("k", json!(1)).await.unwrap());
        assert!(!s.put_if_absent("k", json!(2)).await.unwrap());
        assert_eq!(s.get("k").await.unwrap(), Some(json!(1)));
        assert_eq!(s.len(), 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_and_delete_removes() {
        let s = MemoryStore::new();
        s.put("k", json!("a")).await.unwrap();
        s.put("k", json!("b")).await.unwrap();
        assert_eq!(s.get("k").await.unwrap(), Some(json!("b")));
        assert!(s.delete("k").await.unwrap());
        assert!(!s.delete("k").await.unwrap());
        assert!(s.is_empty());
    }

    #[tokio::test]
    async fn test_typed_load_and_store() {
        let s = MemoryStore::new();
        let codec = required((field("name", string()),));

        assert!(store(&s, &codec, "u", &("Ada".to_string(),)).await.unwrap());
        assert_eq!(
            load(&s, &codec, "u").await.unwrap(),
            Some(("Ada".to_string(),))
        );
        assert_eq!(load(&s, &codec, "missing").await.unwrap(), None);

        s.put("bad", json!({"name": 3})).await.unwrap();
        let err = load(&s, &codec, "bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "bad"));
    }
}
