use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionContext {
    pub thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ActionContext {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            session_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub action: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub context: ActionContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutput {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionError {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

impl ActionError {
    pub const NETWORK_ERROR: &'static str = "NETWORK_ERROR";
    pub const HTTP_ERROR: &'static str = "HTTP_ERROR";
    pub const TOOL_ERROR: &'static str = "TOOL_ERROR";
    pub const VALIDATION_ERROR: &'static str = "VALIDATION_ERROR";
    pub const INVALID_RESPONSE: &'static str = "INVALID_RESPONSE";
    pub const UNKNOWN_ACTION: &'static str = "UNKNOWN_ACTION";
    pub const ACTION_IN_FLIGHT: &'static str = "ACTION_IN_FLIGHT";
}

/// Uniform outcome of a dispatched action. `result` is set when `ok`,
/// `error` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub ok: bool,
    pub action: String,
    #[serde(default)]
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ActionOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionResult {
    pub fn success(
        action: impl Into<String>,
        correlation_id: impl Into<String>,
        output: ActionOutput,
    ) -> Self {
        Self {
            ok: true,
            action: action.into(),
            correlation_id: correlation_id.into(),
            result: Some(output),
            error: None,
        }
    }

    pub fn failure(action: impl Into<String>, code: &str, details: Option<String>) -> Self {
        Self {
            ok: false,
            action: action.into(),
            correlation_id: String::new(),
            result: None,
            error: Some(ActionError {
                code: code.to_string(),
                details,
                missing_fields: None,
            }),
        }
    }

    pub fn with_missing_fields(mut self, fields: Vec<String>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.missing_fields = Some(fields);
        }
        self
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}
