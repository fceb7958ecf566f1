//! In-process key-value store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{non_empty, KeyValueStore, Scope, StoreResult};

type MapKey = (Scope, String);

/// Key-value store held entirely in memory.
///
/// Used by tests and by callers embedding the coordinator next to an
/// existing store adapter.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<MapKey, String>>,
    maps: RwLock<HashMap<MapKey, BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str, scope: Scope) -> StoreResult<Option<String>> {
        let values = self.values.read().await;
        Ok(non_empty(values.get(&(scope, key.to_string())).cloned()))
    }

    async fn put(&self, key: &str, value: &str, scope: Scope) -> StoreResult<()> {
        self.values
            .write()
            .await
            .insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str, scope: Scope) -> StoreResult<()> {
        self.values.write().await.remove(&(scope, key.to_string()));
        Ok(())
    }

    async fn put_map_entry(
        &self,
        map: &str,
        key: &str,
        value: &str,
        scope: Scope,
    ) -> StoreResult<()> {
        self.maps
            .write()
            .await
            .entry((scope, map.to_string()))
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_map_entry(
        &self,
        map: &str,
        key: &str,
        scope: Scope,
    ) -> StoreResult<Option<String>> {
        let maps = self.maps.read().await;
        let entry = maps
            .get(&(scope, map.to_string()))
            .and_then(|entries| entries.get(key))
            .cloned();
        Ok(non_empty(entry))
    }

    async fn delete_map_entry(&self, map: &str, key: &str, scope: Scope) -> StoreResult<()> {
        if let Some(entries) = self.maps.write().await.get_mut(&(scope, map.to_string())) {
            entries.remove(key);
        }
        Ok(())
    }

    async fn contains_map_key(&self, map: &str, key: &str, scope: Scope) -> StoreResult<bool> {
        let maps = self.maps.read().await;
        Ok(maps
            .get(&(scope, map.to_string()))
            .is_some_and(|entries| entries.contains_key(key)))
    }

    async fn get_map_keys(&self, map: &str, scope: Scope) -> StoreResult<Vec<String>> {
        let maps = self.maps.read().await;
        Ok(maps
            .get(&(scope, map.to_string()))
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}
