//! Domain types for triggerhub.
//!
//! This module contains the core data structures:
//! - TriggerRecord: Trigger registry entries
//! - WorkflowMetadata: Per-user workflow documents
//! - FrontendEntry: Live trigger frontend registrations
//! - Invocation: Request/response envelopes of the removal call
//! - Events: Removal journal entries

pub mod events;
pub mod frontend;
pub mod invocation;
pub mod trigger;
pub mod workflow;

// Re-export commonly used types
pub use events::{AssociationEvent, AssociationEventType, EdgeState};
pub use frontend::FrontendEntry;
pub use invocation::{RemovalRequest, Response, ResponseData, ResponseStatus};
pub use trigger::{storage_userid, trigger_id, TriggerRecord};
pub use workflow::{WorkflowDetails, WorkflowMetadata};
