//! Typed views over the key-value store.
//!
//! - TriggerRegistry: trigger id -> owning frontend and associated workflows
//! - FrontendRegistry: frontends currently available
//! - WorkflowStore: per-user workflow metadata

pub mod frontend;
pub mod trigger;
pub mod workflow;

pub use frontend::{FrontendRegistry, MAP_AVAILABLE_FRONTENDS};
pub use trigger::{TriggerRegistry, MAP_TRIGGERS_TO_INFO};
pub use workflow::WorkflowStore;
