//! Request and response envelopes of the delete-trigger-for-workflow call.

use serde::{Deserialize, Serialize};

use super::trigger::{storage_userid, trigger_id};

/// Input of a removal call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalRequest {
    pub email: String,
    pub trigger_name: String,
    pub workflow_name: String,
    /// Derived from `email` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_userid: Option<String>,
}

impl RemovalRequest {
    pub fn storage_userid(&self) -> String {
        self.storage_userid
            .clone()
            .unwrap_or_else(|| storage_userid(&self.email))
    }

    pub fn trigger_id(&self) -> String {
        trigger_id(&self.storage_userid(), &self.trigger_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    pub message: String,
}

/// Output of a removal call: `{"status": ..., "data": {"message": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    pub data: ResponseData,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: ResponseData {
                message: message.into(),
            },
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            data: ResponseData {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    pub fn message(&self) -> &str {
        &self.data.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_shape() {
        let response = Response::success("done");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "success", "data": {"message": "done"}})
        );
    }

    #[test]
    fn test_trigger_id_uses_explicit_storage_userid() {
        let request = RemovalRequest {
            email: "a@b.c".to_string(),
            trigger_name: "mytrigger".to_string(),
            workflow_name: "wf1".to_string(),
            storage_userid: Some("u1".to_string()),
        };
        assert_eq!(request.trigger_id(), "u1_mytrigger");

        let derived = RemovalRequest {
            storage_userid: None,
            ..request
        };
        assert_eq!(derived.trigger_id(), "aATb_c_mytrigger");
    }
}
