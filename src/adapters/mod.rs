//! Adapter interfaces for external systems.
//!
//! The only remote party is the trigger frontend, which owns the live
//! registration of every trigger and is reachable over HTTP.

pub mod frontend;

use async_trait::async_trait;
use serde_json::Value;

// Re-export the HTTP frontend client
pub use frontend::{FrontendAck, FrontendError, HttpFrontendClient};

/// Client for trigger frontends
#[async_trait]
pub trait FrontendClient: Send + Sync {
    /// Ask `frontend_ip_port` to detach `workflows` from `trigger_id`.
    ///
    /// A single attempt; no retry.
    async fn remove_workflows(
        &self,
        frontend_ip_port: &str,
        trigger_id: &str,
        workflows: &[Value],
    ) -> Result<FrontendAck, FrontendError>;

    /// Detach a single workflow reference
    async fn request_remove_workflow(
        &self,
        frontend_ip_port: &str,
        trigger_id: &str,
        workflow_ref: &Value,
    ) -> Result<FrontendAck, FrontendError> {
        self.remove_workflows(frontend_ip_port, trigger_id, std::slice::from_ref(workflow_ref))
            .await
    }
}
