//! Workflow metadata access: name index, metadata documents, live status.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::AssociationError;
use crate::domain::{WorkflowDetails, WorkflowMetadata};
use crate::store::{decode, encode, KeyValueStore, Scope, StoreResult};

#[derive(Clone)]
pub struct WorkflowStore {
    store: Arc<dyn KeyValueStore>,
}

fn index_key(email: &str) -> String {
    format!("{}_list_workflows", email)
}

fn metadata_key(email: &str, workflow_id: &str) -> String {
    format!("{}_workflow_{}", email, workflow_id)
}

fn status_key(workflow_id: &str) -> String {
    format!("workflow_status_{}", workflow_id)
}

impl WorkflowStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Resolve a workflow name to its id via the user's name index
    pub async fn resolve_workflow_id(
        &self,
        email: &str,
        workflow_name: &str,
    ) -> StoreResult<Option<String>> {
        let key = index_key(email);
        let Some(raw) = self.store.get(&key, Scope::Global).await? else {
            return Ok(None);
        };
        let mut index: HashMap<String, String> = decode(&key, &raw)?;
        Ok(index.remove(workflow_name))
    }

    pub async fn fetch(
        &self,
        email: &str,
        workflow_id: &str,
    ) -> StoreResult<Option<WorkflowMetadata>> {
        let key = metadata_key(email, workflow_id);
        self.store
            .get(&key, Scope::Global)
            .await?
            .map(|raw| decode(&key, &raw))
            .transpose()
    }

    /// Live deployment status, if one was published
    pub async fn status(&self, workflow_id: &str) -> StoreResult<Option<String>> {
        self.store.get(&status_key(workflow_id), Scope::Global).await
    }

    /// Look up a workflow by name; `None` when the user has no such workflow
    /// or its metadata document is missing.
    pub async fn describe(
        &self,
        email: &str,
        workflow_name: &str,
    ) -> StoreResult<Option<WorkflowDetails>> {
        let Some(id) = self.resolve_workflow_id(email, workflow_name).await? else {
            return Ok(None);
        };
        let Some(metadata) = self.fetch(email, &id).await? else {
            return Ok(None);
        };
        let live_status = self.status(&id).await?;

        Ok(Some(WorkflowDetails {
            email: email.to_string(),
            name: workflow_name.to_string(),
            id,
            live_status,
            metadata,
        }))
    }

    /// Remove `trigger_name` from the workflow's `associatedTriggers`.
    ///
    /// Idempotent: returns `Ok(false)` when the trigger was not listed, which
    /// leaves the document untouched.
    pub async fn remove_associated_trigger(
        &self,
        email: &str,
        workflow_id: &str,
        workflow_name: &str,
        trigger_name: &str,
    ) -> Result<bool, AssociationError> {
        let key = metadata_key(email, workflow_id);
        let mut metadata =
            self.fetch(email, workflow_id)
                .await?
                .ok_or_else(|| AssociationError::WorkflowMetadataMissing {
                    email: email.to_string(),
                    workflow_name: workflow_name.to_string(),
                })?;

        if !metadata.remove_trigger(trigger_name) {
            info!(%email, %trigger_name, %workflow_name, "trigger not present in workflow");
            return Ok(false);
        }

        let raw = encode(&key, &metadata)?;
        self.store.put(&key, &raw, Scope::Global).await?;
        debug!(%key, "workflow metadata rewritten");
        info!(%email, %trigger_name, %workflow_name, "trigger removed from workflow");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn seeded() -> (WorkflowStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .put("a@b.c_list_workflows", r#"{"wf1":"id1"}"#, Scope::Global)
            .await
            .unwrap();
        store
            .put(
                "a@b.c_workflow_id1",
                r#"{"id":"id1","name":"wf1","status":"deployed","associatedTriggers":{"t1":"","t2":""}}"#,
                Scope::Global,
            )
            .await
            .unwrap();
        store
            .put("workflow_status_id1", "deployed", Scope::Global)
            .await
            .unwrap();
        (WorkflowStore::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_describe() {
        let (workflows, _store) = seeded().await;

        let details = workflows.describe("a@b.c", "wf1").await.unwrap().unwrap();
        assert_eq!(details.id, "id1");
        assert_eq!(details.live_status.as_deref(), Some("deployed"));
        assert!(details.is_deployed());

        assert!(workflows.describe("a@b.c", "other").await.unwrap().is_none());
        assert!(workflows.describe("x@y.z", "wf1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_associated_trigger_is_idempotent() {
        let (workflows, _store) = seeded().await;

        assert!(workflows
            .remove_associated_trigger("a@b.c", "id1", "wf1", "t1")
            .await
            .unwrap());
        assert!(!workflows
            .remove_associated_trigger("a@b.c", "id1", "wf1", "t1")
            .await
            .unwrap());

        let metadata = workflows.fetch("a@b.c", "id1").await.unwrap().unwrap();
        assert!(!metadata.has_trigger("t1"));
        assert!(metadata.has_trigger("t2"));
    }

    #[tokio::test]
    async fn test_rewrite_only_touches_associated_triggers() {
        let (workflows, store) = seeded().await;
        let original = json!({
            "status": "deployed",
            "ASL": {"StartAt": "a"},
            "associatedTriggers": {"t1": "", "t2": ""}
        });
        store
            .put("a@b.c_workflow_id2", &original.to_string(), Scope::Global)
            .await
            .unwrap();

        assert!(workflows
            .remove_associated_trigger("a@b.c", "id2", "wf2", "t1")
            .await
            .unwrap());

        let raw = store
            .get("a@b.c_workflow_id2", Scope::Global)
            .await
            .unwrap()
            .unwrap();
        let mut expected = original;
        expected["associatedTriggers"] = json!({"t2": ""});
        assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_remove_from_missing_metadata() {
        let (workflows, _store) = seeded().await;
        let err = workflows
            .remove_associated_trigger("a@b.c", "gone", "wf9", "t1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssociationError::WorkflowMetadataMissing { .. }
        ));
    }
}
