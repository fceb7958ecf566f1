//! Errors raised while removing a trigger-workflow association.

use thiserror::Error;

use crate::adapters::FrontendError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AssociationError {
    #[error("Trigger: {trigger_name} not found.")]
    TriggerNotFound { trigger_name: String },

    #[error("User: {email}, Workflow: {workflow_name}: couldn't retrieve workflow metadata.")]
    WorkflowMetadataMissing { email: String, workflow_name: String },

    #[error("No available trigger frontend found")]
    NoFrontendAvailable,

    #[error("Frontend: {frontend} not available")]
    FrontendUnavailable { frontend: String },

    /// The frontend was unreachable or refused the removal
    #[error("Error: trigger_id {trigger_id}, {source}")]
    Frontend {
        trigger_id: String,
        #[source]
        source: FrontendError,
    },

    /// The trigger record vanished between the precondition check and use
    #[error("Trigger record {trigger_id} disappeared while removing workflow {workflow_name}")]
    InconsistentState {
        trigger_id: String,
        workflow_name: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Removal task did not finish: {0}")]
    Interrupted(String),
}

impl AssociationError {
    /// Failures of the frontend side only; the registry is still written
    pub fn is_frontend_failure(&self) -> bool {
        matches!(
            self,
            AssociationError::NoFrontendAvailable
                | AssociationError::FrontendUnavailable { .. }
                | AssociationError::Frontend { .. }
        )
    }
}
