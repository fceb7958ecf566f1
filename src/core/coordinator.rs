//! Removal of a trigger-workflow association across the three stores.
//!
//! Three facts have to agree: the trigger registry's `associated_workflows`,
//! the workflow's `associatedTriggers`, and the live registration held by
//! the trigger frontend. Nothing makes these writes atomic, so removal runs
//! as two phases:
//!
//! - Phase A asks the owning frontend to drop the workflow, then removes the
//!   association from the trigger registry. The registry write happens even
//!   when the frontend could not confirm.
//! - Phase B removes the trigger from the workflow metadata. It always runs
//!   after Phase A, whatever Phase A's outcome.
//!
//! Both outcomes are merged into a [`RemovalReport`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn, Instrument};
use uuid::Uuid;

use crate::adapters::{FrontendAck, FrontendClient};
use crate::domain::{AssociationEvent, AssociationEventType, TriggerRecord};
use crate::registry::{FrontendRegistry, TriggerRegistry, WorkflowStore};
use crate::store::KeyValueStore;

use super::error::AssociationError;
use super::journal::Journal;

/// Result of Phase A (frontend + trigger registry)
#[derive(Debug)]
pub enum RegistryOutcome {
    /// The workflow was not associated with the trigger; nothing was written
    NotAssociated,

    /// The frontend confirmed and the registry was updated
    Removed { frontend_message: Option<String> },

    /// The frontend did not confirm, but the registry was updated anyway
    Compensated { cause: AssociationError },

    /// The registry could not be updated
    Unresolved { errors: Vec<AssociationError> },
}

impl RegistryOutcome {
    fn errors(&self) -> Vec<&AssociationError> {
        match self {
            RegistryOutcome::NotAssociated | RegistryOutcome::Removed { .. } => Vec::new(),
            RegistryOutcome::Compensated { cause } => vec![cause],
            RegistryOutcome::Unresolved { errors } => errors.iter().collect(),
        }
    }

    /// Whether the registry no longer lists the workflow
    pub fn registry_converged(&self) -> bool {
        !matches!(self, RegistryOutcome::Unresolved { .. })
    }
}

/// Result of Phase B (workflow metadata)
#[derive(Debug)]
pub enum MetadataOutcome {
    /// The trigger was removed from `associatedTriggers`
    Updated,

    /// The workflow did not list the trigger
    NotAttached,

    /// The user has no such workflow; skipped without error
    WorkflowMissing,

    Failed(AssociationError),
}

/// Merged outcome of one removal call
#[derive(Debug)]
pub struct RemovalReport {
    pub trigger_name: String,
    pub trigger_id: String,
    pub workflow_name: String,
    pub registry: RegistryOutcome,
    pub metadata: MetadataOutcome,
}

impl RemovalReport {
    /// All errors, Phase A first
    pub fn errors(&self) -> Vec<&AssociationError> {
        let mut errors = self.registry.errors();
        if let MetadataOutcome::Failed(e) = &self.metadata {
            errors.push(e);
        }
        errors
    }

    pub fn is_success(&self) -> bool {
        self.errors().is_empty()
    }

    /// Display message: the joined errors on failure, otherwise the
    /// frontend's confirmation (empty for a no-op)
    pub fn message(&self) -> String {
        let errors = self.errors();
        if !errors.is_empty() {
            return errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ");
        }

        match &self.registry {
            RegistryOutcome::Removed { frontend_message } => format!(
                "Trigger {} removed successfully from workflow:{}. Message: {}",
                self.trigger_name,
                self.workflow_name,
                frontend_message.as_deref().unwrap_or_default()
            ),
            _ => String::new(),
        }
    }
}

/// Orchestrates association removal over injected registries and client
pub struct Coordinator {
    triggers: TriggerRegistry,
    frontends: FrontendRegistry,
    workflows: WorkflowStore,
    client: Arc<dyn FrontendClient>,
    journal: Option<Journal>,
}

impl Coordinator {
    /// Coordinator whose registries all share one store
    pub fn new(store: Arc<dyn KeyValueStore>, client: Arc<dyn FrontendClient>) -> Self {
        Self::from_parts(
            TriggerRegistry::new(Arc::clone(&store)),
            FrontendRegistry::new(Arc::clone(&store)),
            WorkflowStore::new(store),
            client,
        )
    }

    pub fn from_parts(
        triggers: TriggerRegistry,
        frontends: FrontendRegistry,
        workflows: WorkflowStore,
        client: Arc<dyn FrontendClient>,
    ) -> Self {
        Self {
            triggers,
            frontends,
            workflows,
            client,
            journal: None,
        }
    }

    /// Record every removal step in `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    pub fn frontends(&self) -> &FrontendRegistry {
        &self.frontends
    }

    pub fn workflows(&self) -> &WorkflowStore {
        &self.workflows
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// Remove `workflow_name` from `trigger_id` everywhere.
    ///
    /// Never fails outright: every error is captured in the report. Phase B
    /// runs after Phase A regardless of Phase A's outcome.
    #[instrument(skip(self))]
    pub async fn remove_trigger_workflow_association(
        &self,
        email: &str,
        trigger_name: &str,
        trigger_id: &str,
        workflow_name: &str,
    ) -> RemovalReport {
        let removal_id = Uuid::new_v4();

        let registry = self
            .detach_from_frontend(removal_id, trigger_id, workflow_name)
            .await;
        let metadata = self
            .detach_from_metadata(removal_id, email, trigger_name, trigger_id, workflow_name)
            .await;

        let report = RemovalReport {
            trigger_name: trigger_name.to_string(),
            trigger_id: trigger_id.to_string(),
            workflow_name: workflow_name.to_string(),
            registry,
            metadata,
        };

        let message = report.message();
        let event = if report.is_success() {
            info!(%message, "association removed");
            AssociationEvent::new(
                removal_id,
                trigger_id,
                workflow_name,
                AssociationEventType::RemovalCompleted,
                "removal completed",
            )
        } else {
            warn!(
                %message,
                registry_converged = report.registry.registry_converged(),
                "association removal finished with errors"
            );
            AssociationEvent::new(
                removal_id,
                trigger_id,
                workflow_name,
                AssociationEventType::RemovalFailed,
                "removal finished with errors",
            )
            .with_error(message)
        };
        self.record(event).await;

        report
    }

    /// Run the removal on its own task.
    ///
    /// Dropping the returned future does not cancel the removal, so Phase B
    /// still runs once Phase A has started.
    pub async fn remove_detached(
        self: &Arc<Self>,
        email: String,
        trigger_name: String,
        trigger_id: String,
        workflow_name: String,
    ) -> Result<RemovalReport, AssociationError> {
        let this = Arc::clone(self);
        tokio::spawn(
            async move {
                this.remove_trigger_workflow_association(
                    &email,
                    &trigger_name,
                    &trigger_id,
                    &workflow_name,
                )
                .await
            }
            .in_current_span(),
        )
        .await
        .map_err(|e| AssociationError::Interrupted(e.to_string()))
    }

    /// Phase A: tell the frontend, then drop the association from the registry
    #[instrument(skip(self, removal_id))]
    async fn detach_from_frontend(
        &self,
        removal_id: Uuid,
        trigger_id: &str,
        workflow_name: &str,
    ) -> RegistryOutcome {
        let Some(mut record) = self.triggers.lookup(trigger_id).await else {
            return RegistryOutcome::Unresolved {
                errors: vec![AssociationError::InconsistentState {
                    trigger_id: trigger_id.to_string(),
                    workflow_name: workflow_name.to_string(),
                }],
            };
        };

        let Some(workflow_ref) = record.associated_workflows.get(workflow_name).cloned() else {
            info!("workflow not associated with trigger, nothing to remove");
            return RegistryOutcome::NotAssociated;
        };

        self.record(AssociationEvent::new(
            removal_id,
            trigger_id,
            workflow_name,
            AssociationEventType::RemovalRequested,
            format!("removing via frontend {}", record.frontend_ip_port),
        ))
        .await;

        let attempt = self.notify_frontend(&record, trigger_id, &workflow_ref).await;
        match &attempt {
            Ok(_) => {
                self.record(AssociationEvent::new(
                    removal_id,
                    trigger_id,
                    workflow_name,
                    AssociationEventType::FrontendConfirmed,
                    "frontend confirmed",
                ))
                .await
            }
            Err(e) => {
                match e {
                    AssociationError::Frontend { source, .. } => warn!(
                        error = %e,
                        frontend_message = ?source.frontend_message(),
                        "frontend did not confirm, removing from registry anyway"
                    ),
                    _ if e.is_frontend_failure() => {
                        warn!(error = %e, "no frontend to notify, removing from registry anyway")
                    }
                    _ => warn!(error = %e, "frontend lookup failed, removing from registry anyway"),
                }
                self.record(
                    AssociationEvent::new(
                        removal_id,
                        trigger_id,
                        workflow_name,
                        AssociationEventType::FrontendFailed,
                        "frontend did not confirm",
                    )
                    .with_error(e.to_string()),
                )
                .await
            }
        }

        // The registry drops the association whether or not the frontend confirmed.
        record.associated_workflows.remove(workflow_name);
        let saved = self.triggers.save(trigger_id, &record).await;
        if saved.is_ok() {
            self.record(AssociationEvent::new(
                removal_id,
                trigger_id,
                workflow_name,
                AssociationEventType::RegistryUpdated,
                "association removed from trigger registry",
            ))
            .await;
        }

        match (attempt, saved) {
            (Ok(ack), Ok(())) => RegistryOutcome::Removed {
                frontend_message: ack.message,
            },
            (Err(cause), Ok(())) => RegistryOutcome::Compensated { cause },
            (Ok(_), Err(e)) => RegistryOutcome::Unresolved {
                errors: vec![e.into()],
            },
            (Err(cause), Err(e)) => RegistryOutcome::Unresolved {
                errors: vec![cause, e.into()],
            },
        }
    }

    async fn notify_frontend(
        &self,
        record: &TriggerRecord,
        trigger_id: &str,
        workflow_ref: &Value,
    ) -> Result<FrontendAck, AssociationError> {
        let available = self.frontends.list_available().await?;
        if available.is_empty() {
            return Err(AssociationError::NoFrontendAvailable);
        }

        let frontend = &record.frontend_ip_port;
        if !available.contains(frontend) {
            return Err(AssociationError::FrontendUnavailable {
                frontend: frontend.clone(),
            });
        }

        self.client
            .request_remove_workflow(frontend, trigger_id, workflow_ref)
            .await
            .map_err(|source| AssociationError::Frontend {
                trigger_id: trigger_id.to_string(),
                source,
            })
    }

    /// Phase B: drop the trigger from the workflow's metadata
    #[instrument(skip(self, removal_id, trigger_id))]
    async fn detach_from_metadata(
        &self,
        removal_id: Uuid,
        email: &str,
        trigger_name: &str,
        trigger_id: &str,
        workflow_name: &str,
    ) -> MetadataOutcome {
        let details = match self.workflows.describe(email, workflow_name).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                info!("workflow not found for user, metadata left alone");
                self.record(AssociationEvent::new(
                    removal_id,
                    trigger_id,
                    workflow_name,
                    AssociationEventType::MetadataSkipped,
                    "workflow not found",
                ))
                .await;
                return MetadataOutcome::WorkflowMissing;
            }
            Err(e) => return MetadataOutcome::Failed(e.into()),
        };
        debug!(workflow_id = %details.id, deployed = details.is_deployed(), "workflow resolved");

        match self
            .workflows
            .remove_associated_trigger(email, &details.id, workflow_name, trigger_name)
            .await
        {
            Ok(true) => {
                self.record(AssociationEvent::new(
                    removal_id,
                    trigger_id,
                    workflow_name,
                    AssociationEventType::MetadataUpdated,
                    "trigger removed from workflow metadata",
                ))
                .await;
                MetadataOutcome::Updated
            }
            Ok(false) => {
                self.record(AssociationEvent::new(
                    removal_id,
                    trigger_id,
                    workflow_name,
                    AssociationEventType::MetadataSkipped,
                    "trigger not listed in workflow metadata",
                ))
                .await;
                MetadataOutcome::NotAttached
            }
            Err(e) => MetadataOutcome::Failed(e),
        }
    }

    async fn record(&self, event: AssociationEvent) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(&event).await {
                warn!(error = %e, "failed to append journal event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FrontendError;

    fn report(registry: RegistryOutcome, metadata: MetadataOutcome) -> RemovalReport {
        RemovalReport {
            trigger_name: "mytrigger".to_string(),
            trigger_id: "u1_mytrigger".to_string(),
            workflow_name: "wf1".to_string(),
            registry,
            metadata,
        }
    }

    #[test]
    fn test_success_message() {
        let r = report(
            RegistryOutcome::Removed {
                frontend_message: Some("removed".to_string()),
            },
            MetadataOutcome::Updated,
        );
        assert!(r.is_success());
        assert_eq!(
            r.message(),
            "Trigger mytrigger removed successfully from workflow:wf1. Message: removed"
        );
    }

    #[test]
    fn test_noop_message_is_empty() {
        let r = report(RegistryOutcome::NotAssociated, MetadataOutcome::WorkflowMissing);
        assert!(r.is_success());
        assert_eq!(r.message(), "");
    }

    #[test]
    fn test_errors_joined_in_phase_order() {
        let r = report(
            RegistryOutcome::Compensated {
                cause: AssociationError::NoFrontendAvailable,
            },
            MetadataOutcome::Failed(AssociationError::WorkflowMetadataMissing {
                email: "a@b.c".to_string(),
                workflow_name: "wf1".to_string(),
            }),
        );
        assert!(!r.is_success());
        assert!(r.registry.registry_converged());
        assert_eq!(
            r.message(),
            "No available trigger frontend found, User: a@b.c, Workflow: wf1: couldn't retrieve workflow metadata."
        );
    }

    #[test]
    fn test_unresolved_lists_all_errors() {
        let r = report(
            RegistryOutcome::Unresolved {
                errors: vec![
                    AssociationError::Frontend {
                        trigger_id: "u1_mytrigger".to_string(),
                        source: FrontendError::Malformed("x".to_string()),
                    },
                    AssociationError::Interrupted("store down".to_string()),
                ],
            },
            MetadataOutcome::NotAttached,
        );
        assert_eq!(r.errors().len(), 2);
        assert!(!r.registry.registry_converged());
    }
}
