//! Per-user workflow metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Workflow metadata document stored under `{email}_workflow_{id}`.
///
/// Owned by deployment; this crate only edits `associated_triggers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_triggerable_tables: Option<BTreeMap<String, Value>>,

    /// Trigger name -> placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_triggers: Option<BTreeMap<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowMetadata {
    /// True when the workflow is `deployed` or `deploying`
    pub fn is_deployed(&self) -> bool {
        matches!(self.status.as_deref(), Some("deployed") | Some("deploying"))
    }

    pub fn has_trigger(&self, trigger_name: &str) -> bool {
        self.associated_triggers
            .as_ref()
            .is_some_and(|triggers| triggers.contains_key(trigger_name))
    }

    /// Drop a trigger from `associatedTriggers`; returns whether it was there
    pub fn remove_trigger(&mut self, trigger_name: &str) -> bool {
        self.associated_triggers
            .get_or_insert_with(BTreeMap::new)
            .remove(trigger_name)
            .is_some()
    }
}

/// Everything known about a named workflow of one user
#[derive(Debug, Clone)]
pub struct WorkflowDetails {
    pub email: String,
    pub name: String,
    pub id: String,
    /// Live status from `workflow_status_{id}`, if published
    pub live_status: Option<String>,
    pub metadata: WorkflowMetadata,
}

impl WorkflowDetails {
    pub fn is_deployed(&self) -> bool {
        self.metadata.is_deployed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deployed_states() {
        let mut wf = WorkflowMetadata::default();
        assert!(!wf.is_deployed());

        wf.status = Some("deploying".to_string());
        assert!(wf.is_deployed());

        wf.status = Some("deployed".to_string());
        assert!(wf.is_deployed());

        wf.status = Some("undeployed".to_string());
        assert!(!wf.is_deployed());
    }

    #[test]
    fn test_camel_case_fields_and_extras() {
        let raw = json!({
            "id": "wf-id-1",
            "name": "wf1",
            "status": "deployed",
            "associatedTriggers": {"mytrigger": ""},
            "associatedTriggerableTables": {},
            "ASL": {"StartAt": "a"}
        });

        let wf: WorkflowMetadata = serde_json::from_value(raw.clone()).unwrap();
        assert!(wf.has_trigger("mytrigger"));
        assert_eq!(wf.extra["ASL"], json!({"StartAt": "a"}));
        assert_eq!(serde_json::to_value(&wf).unwrap(), raw);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let raw = json!({"status": "deployed", "associatedTriggers": {"t": ""}});

        let mut wf: WorkflowMetadata = serde_json::from_value(raw).unwrap();
        assert!(wf.id.is_none());
        assert!(wf.remove_trigger("t"));
        assert_eq!(
            serde_json::to_value(&wf).unwrap(),
            json!({"status": "deployed", "associatedTriggers": {}})
        );
    }

    #[test]
    fn test_remove_trigger_without_map() {
        let mut wf = WorkflowMetadata::default();
        assert!(!wf.remove_trigger("t"));
        assert_eq!(wf.associated_triggers, Some(BTreeMap::new()));
    }
}
