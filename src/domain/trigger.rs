//! Trigger registry records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A registered trigger as stored in the global trigger map.
///
/// Only the owning frontend and the workflow associations are interpreted
/// here. Every other field written at trigger creation is carried through
/// unchanged so a read-modify-write never drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// `host:port` of the frontend that runs this trigger
    pub frontend_ip_port: String,

    /// Workflow name -> opaque workflow reference sent to the frontend
    #[serde(default)]
    pub associated_workflows: BTreeMap<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TriggerRecord {
    pub fn new(frontend_ip_port: impl Into<String>) -> Self {
        Self {
            frontend_ip_port: frontend_ip_port.into(),
            associated_workflows: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style association, mostly for fixtures
    pub fn with_workflow(mut self, workflow_name: impl Into<String>, reference: Value) -> Self {
        self.associated_workflows
            .insert(workflow_name.into(), reference);
        self
    }

    pub fn is_associated(&self, workflow_name: &str) -> bool {
        self.associated_workflows.contains_key(workflow_name)
    }
}

/// Registry key of a user's trigger: `{storage_userid}_{trigger_name}`
pub fn trigger_id(storage_userid: &str, trigger_name: &str) -> String {
    format!("{}_{}", storage_userid, trigger_name)
}

/// Storage user id derived from an email address.
///
/// `@` becomes `AT`, while `.` and `-` become `_`.
pub fn storage_userid(email: &str) -> String {
    email.replace('@', "AT").replace(['.', '-'], "_")
}
