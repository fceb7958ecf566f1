//! Key-value storage shared by the trigger and workflow registries.
//!
//! The platform store only offers single-key operations: get/put/delete of
//! opaque strings, plus named maps of string entries. There is no
//! transaction spanning keys, so every write here is last-writer-wins.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Visibility namespace of a key.
///
/// Keys in different scopes never collide. Everything this crate touches
/// lives in the global scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Platform-wide keys (registries, workflow metadata)
    Global,
    /// Per-sandbox keys
    Private,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Private => "private",
        }
    }
}

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend unavailable: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Single-key storage interface.
///
/// Empty strings are treated as absent values by every reader, matching the
/// way the platform store reports missing keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str, scope: Scope) -> StoreResult<Option<String>>;

    async fn put(&self, key: &str, value: &str, scope: Scope) -> StoreResult<()>;

    async fn delete(&self, key: &str, scope: Scope) -> StoreResult<()>;

    async fn put_map_entry(
        &self,
        map: &str,
        key: &str,
        value: &str,
        scope: Scope,
    ) -> StoreResult<()>;

    async fn get_map_entry(&self, map: &str, key: &str, scope: Scope)
        -> StoreResult<Option<String>>;

    async fn delete_map_entry(&self, map: &str, key: &str, scope: Scope) -> StoreResult<()>;

    async fn contains_map_key(&self, map: &str, key: &str, scope: Scope) -> StoreResult<bool>;

    /// All keys of a map, sorted
    async fn get_map_keys(&self, map: &str, scope: Scope) -> StoreResult<Vec<String>>;
}

/// Drop empty values so callers only see real content
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Decode a JSON document read from `key`
pub(crate) fn decode<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Encode a JSON document destined for `key`
pub(crate) fn encode<T: serde::Serialize>(key: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_values() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_decode_error_names_key() {
        let err = decode::<serde_json::Value>("bad_key", "{not json").unwrap_err();
        assert!(err.to_string().contains("bad_key"));
    }
}
