//! Registry of available trigger frontends (read-only here).

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::FrontendEntry;
use crate::store::{decode, KeyValueStore, Scope, StoreResult};

/// Map the frontends publish themselves into. The misspelling is the
/// platform's actual key.
pub const MAP_AVAILABLE_FRONTENDS: &str = "available_triggers_frontned_map";

#[derive(Clone)]
pub struct FrontendRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl FrontendRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Snapshot of the frontends currently registered
    pub async fn list_available(&self) -> StoreResult<BTreeSet<String>> {
        let keys = self
            .store
            .get_map_keys(MAP_AVAILABLE_FRONTENDS, Scope::Global)
            .await?;
        Ok(keys.into_iter().collect())
    }

    pub async fn is_available(&self, frontend_ip_port: &str) -> StoreResult<bool> {
        self.store
            .contains_map_key(MAP_AVAILABLE_FRONTENDS, frontend_ip_port, Scope::Global)
            .await
    }

    pub async fn info(&self, frontend_ip_port: &str) -> StoreResult<Option<FrontendEntry>> {
        self.store
            .get_map_entry(MAP_AVAILABLE_FRONTENDS, frontend_ip_port, Scope::Global)
            .await?
            .map(|raw| decode(frontend_ip_port, &raw))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_available_frontends() {
        let store = Arc::new(MemoryStore::new());
        let registry = FrontendRegistry::new(store.clone());
        assert!(registry.list_available().await.unwrap().is_empty());

        store
            .put_map_entry(
                MAP_AVAILABLE_FRONTENDS,
                "10.0.0.5:9000",
                r#"{"status":"ready"}"#,
                Scope::Global,
            )
            .await
            .unwrap();

        let available = registry.list_available().await.unwrap();
        assert!(available.contains("10.0.0.5:9000"));
        assert!(registry.is_available("10.0.0.5:9000").await.unwrap());
        assert!(!registry.is_available("10.0.0.6:9000").await.unwrap());

        let entry = registry.info("10.0.0.5:9000").await.unwrap().unwrap();
        assert_eq!(entry.get("status"), Some(&json!("ready")));
        assert_eq!(registry.info("10.0.0.6:9000").await.unwrap(), None);
    }
}
