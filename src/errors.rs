use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("tool endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed tool response: {0}")]
    Malformed(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ToolError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
            ToolError::MissingFields(_) | ToolError::Invalid { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ToolError::Http { .. } | ToolError::Network(_) | ToolError::Malformed(_) => {
                StatusCode::BAD_GATEWAY
            }
            ToolError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({ "error": self.to_string() });
        match &self {
            ToolError::MissingFields(fields) => body["missingFields"] = json!(fields),
            ToolError::Invalid { field, .. } => body["field"] = json!(field),
            _ => {}
        }
        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Tool(e) => {
                if e.status().is_server_error() {
                    tracing::error!(error = %e, "tool request failed");
                }
                e.into_response()
            }
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "configuration error");
                let body = json!({ "error": msg });
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
            }
        }
    }
}
