use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

// POST /tools/:tool_name
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(tool_name): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let output = state.tools.call(&tool_name, &payload)?;
    Ok(Json(output))
}
