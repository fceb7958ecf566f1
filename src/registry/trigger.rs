//! Global trigger registry: trigger id -> [`TriggerRecord`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::TriggerRecord;
use crate::store::{decode, encode, KeyValueStore, Scope, StoreResult};

/// Map holding every registered trigger
pub const MAP_TRIGGERS_TO_INFO: &str = "triggers_to_info_map";

#[derive(Clone)]
pub struct TriggerRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl TriggerRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a trigger record.
    ///
    /// A missing trigger is an expected answer, so read and decode failures
    /// are logged and reported as absent rather than raised.
    pub async fn lookup(&self, trigger_id: &str) -> Option<TriggerRecord> {
        let raw = match self
            .store
            .get_map_entry(MAP_TRIGGERS_TO_INFO, trigger_id, Scope::Global)
            .await
        {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(%trigger_id, error = %e, "trigger lookup failed");
                return None;
            }
        };

        match decode::<TriggerRecord>(trigger_id, &raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(%trigger_id, error = %e, "unreadable trigger record");
                None
            }
        }
    }

    /// Overwrite a trigger record (last writer wins)
    pub async fn save(&self, trigger_id: &str, record: &TriggerRecord) -> StoreResult<()> {
        let raw = encode(trigger_id, record)?;
        debug!(%trigger_id, data = %raw, "saving trigger record");
        self.store
            .put_map_entry(MAP_TRIGGERS_TO_INFO, trigger_id, &raw, Scope::Global)
            .await
    }

    pub async fn contains(&self, trigger_id: &str) -> StoreResult<bool> {
        self.store
            .contains_map_key(MAP_TRIGGERS_TO_INFO, trigger_id, Scope::Global)
            .await
    }

    /// A user's trigger list (trigger name -> trigger id)
    pub async fn user_triggers(&self, email: &str) -> StoreResult<BTreeMap<String, String>> {
        let key = format!("{}_list_triggers", email);
        match self.store.get(&key, Scope::Global).await? {
            Some(raw) => decode(&key, &raw),
            None => Ok(BTreeMap::new()),
        }
    }
}
