//! Trigger frontend registrations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Self-published description of a live trigger frontend.
///
/// Written by the frontend's own registration loop; its fields are not
/// interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontendEntry {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl FrontendEntry {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
