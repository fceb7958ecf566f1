//! Core removal logic.
//!
//! This module contains:
//! - Coordinator: Two-phase association removal with compensation
//! - Handler: Request/response boundary of the removal call
//! - Journal: Append-only record of removal steps
//! - Error: Typed failures collected across phases

pub mod coordinator;
pub mod error;
pub mod handler;
pub mod journal;

// Re-export commonly used types
pub use coordinator::{Coordinator, MetadataOutcome, RegistryOutcome, RemovalReport};
pub use error::AssociationError;
pub use handler::{delete_trigger_for_workflow, handle_request, MISSING_FIELDS_MESSAGE};
pub use journal::Journal;
