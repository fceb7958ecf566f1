//! Journal events for trigger-workflow association removals.
//!
//! Each removal appends a short sequence of events. Replaying the events of a
//! single (trigger, workflow) edge tells where that edge ended up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single entry in the removal journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationEvent {
    /// Unique identifier for this event
    pub id: Uuid,

    /// When this event occurred (ISO 8601)
    pub timestamp: DateTime<Utc>,

    /// Removal this event belongs to
    pub removal_id: Uuid,

    pub trigger_id: String,

    pub workflow_name: String,

    pub event_type: AssociationEventType,

    /// Human-readable summary
    pub summary: String,

    /// Error message if something failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssociationEvent {
    pub fn new(
        removal_id: Uuid,
        trigger_id: impl Into<String>,
        workflow_name: impl Into<String>,
        event_type: AssociationEventType,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            removal_id,
            trigger_id: trigger_id.into(),
            workflow_name: workflow_name.into(),
            event_type,
            summary: summary.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Whether this event belongs to the given edge
    pub fn is_for(&self, trigger_id: &str, workflow_name: &str) -> bool {
        self.trigger_id == trigger_id && self.workflow_name == workflow_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationEventType {
    /// The workflow was associated and removal started
    RemovalRequested,

    /// The owning frontend confirmed the removal
    FrontendConfirmed,

    /// The frontend could not be reached or refused
    FrontendFailed,

    /// The association was dropped from the trigger registry
    RegistryUpdated,

    /// The trigger was dropped from workflow metadata
    MetadataUpdated,

    /// Workflow metadata had nothing to change
    MetadataSkipped,

    RemovalCompleted,

    RemovalFailed,
}

/// Where a trigger-workflow edge stands, from the registry's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    Active,
    PendingFrontendConfirm,
    Removed,
}

impl EdgeState {
    /// Fold the journal events of one edge into its latest state.
    ///
    /// Returns `None` when the journal holds nothing for the edge.
    pub fn from_events<'a, I>(events: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a AssociationEvent>,
    {
        events.into_iter().fold(None, |state, event| {
            match event.event_type {
                AssociationEventType::RemovalRequested => Some(EdgeState::PendingFrontendConfirm),
                AssociationEventType::RegistryUpdated => Some(EdgeState::Removed),
                // The registry write did not land, so the edge is still live.
                AssociationEventType::RemovalFailed
                    if state == Some(EdgeState::PendingFrontendConfirm) =>
                {
                    Some(EdgeState::Active)
                }
                _ => state,
            }
        })
    }
}
