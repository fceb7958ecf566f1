//! SQLite-backed key-value store.
//!
//! Plain values live in `kv`, map entries in `map_entries`; both are keyed by
//! scope. Every write is an upsert on its primary key, so concurrent writers
//! to one key resolve as last-writer-wins.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{non_empty, KeyValueStore, Scope, StoreError, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    scope TEXT NOT NULL,
    key   TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (scope, key)
);
CREATE TABLE IF NOT EXISTS map_entries (
    scope TEXT NOT NULL,
    map   TEXT NOT NULL,
    key   TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (scope, map, key)
);
";

/// Durable store over a single SQLite connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "sqlite store opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking statement off the async executor
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))?;
            f(&guard).map_err(StoreError::from)
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str, scope: Scope) -> StoreResult<Option<String>> {
        let key = key.to_string();
        let value = self
            .run(move |conn| {
                conn.query_row(
                    "SELECT value FROM kv WHERE scope = ?1 AND key = ?2",
                    params![scope.as_str(), key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        Ok(non_empty(value))
    }

    async fn put(&self, key: &str, value: &str, scope: Scope) -> StoreResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO kv (scope, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(scope, key) DO UPDATE SET value = excluded.value",
                params![scope.as_str(), key, value],
            )
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str, scope: Scope) -> StoreResult<()> {
        let key = key.to_string();
        self.run(move |conn| {
            conn.execute(
                "DELETE FROM kv WHERE scope = ?1 AND key = ?2",
                params![scope.as_str(), key],
            )
        })
        .await?;
        Ok(())
    }

    async fn put_map_entry(
        &self,
        map: &str,
        key: &str,
        value: &str,
        scope: Scope,
    ) -> StoreResult<()> {
        let (map, key, value) = (map.to_string(), key.to_string(), value.to_string());
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO map_entries (scope, map, key, value) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(scope, map, key) DO UPDATE SET value = excluded.value",
                params![scope.as_str(), map, key, value],
            )
        })
        .await?;
        Ok(())
    }

    async fn get_map_entry(
        &self,
        map: &str,
        key: &str,
        scope: Scope,
    ) -> StoreResult<Option<String>> {
        let (map, key) = (map.to_string(), key.to_string());
        let value = self
            .run(move |conn| {
                conn.query_row(
                    "SELECT value FROM map_entries WHERE scope = ?1 AND map = ?2 AND key = ?3",
                    params![scope.as_str(), map, key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        Ok(non_empty(value))
    }

    async fn delete_map_entry(&self, map: &str, key: &str, scope: Scope) -> StoreResult<()> {
        let (map, key) = (map.to_string(), key.to_string());
        self.run(move |conn| {
            conn.execute(
                "DELETE FROM map_entries WHERE scope = ?1 AND map = ?2 AND key = ?3",
                params![scope.as_str(), map, key],
            )
        })
        .await?;
        Ok(())
    }

    async fn contains_map_key(&self, map: &str, key: &str, scope: Scope) -> StoreResult<bool> {
        let (map, key) = (map.to_string(), key.to_string());
        self.run(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM map_entries WHERE scope = ?1 AND map = ?2 AND key = ?3)",
                params![scope.as_str(), map, key],
                |row| row.get::<_, bool>(0),
            )
        })
        .await
    }

    async fn get_map_keys(&self, map: &str, scope: Scope) -> StoreResult<Vec<String>> {
        let map = map.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key FROM map_entries WHERE scope = ?1 AND map = ?2 ORDER BY key",
            )?;
            let keys = stmt
                .query_map(params![scope.as_str(), map], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("k", "v1", Scope::Global).await.unwrap();
        store.put("k", "v2", Scope::Global).await.unwrap();
        assert_eq!(
            store.get("k", Scope::Global).await.unwrap(),
            Some("v2".to_string())
        );

        store.delete("k", Scope::Global).await.unwrap();
        assert_eq!(store.get("k", Scope::Global).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_map_keys_sorted_and_scoped() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .put_map_entry("frontends", "10.0.0.9:9000", "{}", Scope::Global)
            .await
            .unwrap();
        store
            .put_map_entry("frontends", "10.0.0.1:9000", "{}", Scope::Global)
            .await
            .unwrap();
        store
            .put_map_entry("frontends", "10.0.0.5:9000", "{}", Scope::Private)
            .await
            .unwrap();

        let keys = store.get_map_keys("frontends", Scope::Global).await.unwrap();
        assert_eq!(keys, vec!["10.0.0.1:9000", "10.0.0.9:9000"]);
        assert!(!store
            .contains_map_key("frontends", "10.0.0.5:9000", Scope::Global)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("state.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .put_map_entry("triggers", "u1_t", r#"{"frontend_ip_port":"h:1"}"#, Scope::Global)
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store
                .get_map_entry("triggers", "u1_t", Scope::Global)
                .await
                .unwrap(),
            Some(r#"{"frontend_ip_port":"h:1"}"#.to_string())
        );
    }
}
