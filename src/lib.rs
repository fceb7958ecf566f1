//! triggerhub - Trigger/workflow association consistency
//!
//! Keeps three independently stored facts in agreement:
//! - the global trigger registry (trigger -> frontend, associated workflows)
//! - per-workflow metadata (`associatedTriggers`)
//! - the live registration held by the remote trigger frontend
//!
//! There is no transaction across them. Removing an association therefore
//! runs as two best-effort phases with compensating writes, see
//! [`core::Coordinator`].
//!
//! # Modules
//!
//! - `adapters`: Trigger frontend HTTP client
//! - `core`: Coordinator, request handler, removal journal
//! - `domain`: Data structures (TriggerRecord, WorkflowMetadata, events)
//! - `registry`: Typed access to the trigger, frontend and workflow stores
//! - `store`: Key-value store interface and backends
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Detach a trigger from a workflow
//! triggerhub remove --email jane@example.com --trigger mytrigger --workflow wf1
//!
//! # Inspect what happened
//! triggerhub history --trigger janeATexample_com_mytrigger --workflow wf1
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod registry;
pub mod store;

// Re-export main types at crate root for convenience
pub use adapters::{FrontendClient, HttpFrontendClient};
pub use crate::core::{delete_trigger_for_workflow, AssociationError, Coordinator, RemovalReport};
pub use domain::{RemovalRequest, Response, TriggerRecord, WorkflowMetadata};
pub use store::{KeyValueStore, MemoryStore, Scope, SqliteStore};
