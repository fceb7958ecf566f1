//! Entry point for the delete-trigger-for-workflow call.
//!
//! Turns the JSON request into a coordinator run and the run's report into
//! the `{"status", "data": {"message"}}` envelope. No error escapes as
//! anything other than a failure response.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::{RemovalRequest, Response};

use super::coordinator::Coordinator;
use super::error::AssociationError;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Couldn't delete trigger for workflow; either user email or trigger_name or workflow_name is missing";

/// Handle a raw JSON request
#[instrument(skip(coordinator, input))]
pub async fn delete_trigger_for_workflow(coordinator: &Arc<Coordinator>, input: &Value) -> Response {
    info!(%input, "delete trigger for workflow requested");

    let request: RemovalRequest = match serde_json::from_value(input.clone()) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejecting malformed request");
            return Response::failure(MISSING_FIELDS_MESSAGE);
        }
    };

    handle_request(coordinator, request).await
}

/// Handle an already-parsed request
#[instrument(skip(coordinator), fields(trigger = %request.trigger_name, workflow = %request.workflow_name))]
pub async fn handle_request(coordinator: &Arc<Coordinator>, request: RemovalRequest) -> Response {
    let trigger_id = request.trigger_id();

    if coordinator.triggers().lookup(&trigger_id).await.is_none() {
        info!(email = %request.email, %trigger_id, "trigger not found");
        let err = AssociationError::TriggerNotFound {
            trigger_name: request.trigger_name.clone(),
        };
        return failure(&request, &err.to_string());
    }

    let report = match coordinator
        .remove_detached(
            request.email.clone(),
            request.trigger_name.clone(),
            trigger_id,
            request.workflow_name.clone(),
        )
        .await
    {
        Ok(report) => report,
        Err(e) => return failure(&request, &e.to_string()),
    };

    let response = if report.is_success() {
        Response::success(report.message())
    } else {
        failure(&request, &report.message())
    };
    info!(status = ?response.status, message = %response.message(), "delete trigger for workflow finished");
    response
}

fn failure(request: &RemovalRequest, error: &str) -> Response {
    Response::failure(format!(
        "Couldn't delete the trigger: {} for workflow: {}, error: {}",
        request.trigger_name, request.workflow_name, error
    ))
}
