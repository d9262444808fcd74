use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::models::action::{ActionError, ActionResult, DispatchRequest};
use crate::services::dispatch::{normalize_tool_output, tool_error_result};
use crate::services::tools::BookingTools;
use crate::state::AppState;

// POST /actions/dispatch
//
// Always answers 200 with an ActionResult; failures live in the body.
pub async fn dispatch_action(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> Json<ActionResult> {
    let DispatchRequest {
        action,
        mut payload,
        context,
    } = request;

    if !BookingTools::has_tool(&action) {
        tracing::warn!(action = %action, "unknown action");
        return Json(ActionResult::failure(
            &action,
            ActionError::UNKNOWN_ACTION,
            Some(format!("no handler for action {action:?}")),
        ));
    }

    if !context.thread_id.is_empty() {
        payload
            .entry("threadId")
            .or_insert_with(|| Value::String(context.thread_id.clone()));
    }

    let result = match state.tools.call(&action, &Value::Object(payload)) {
        Ok(output) => normalize_tool_output(&action, output),
        Err(e) => tool_error_result(&action, e),
    };
    Json(result)
}
