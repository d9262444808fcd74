use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::ToolCaller;
use crate::errors::ToolError;
use crate::models::action::{ActionError, ActionResult, DispatchRequest};

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build HTTP client, using one without a timeout");
            reqwest::Client::new()
        })
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub struct HttpActionClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpActionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: build_client(timeout),
        }
    }

    pub async fn dispatch(&self, request: &DispatchRequest) -> ActionResult {
        let action = request.action.as_str();
        let url = join(&self.base_url, "actions/dispatch");

        let resp = match self.client.post(&url).json(request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(action, url = %url, error = %e, "action endpoint unreachable");
                let details = Some(e.to_string());
                return ActionResult::failure(action, ActionError::NETWORK_ERROR, details);
            }
        };

        // Check the status before reading the body.
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return http_failure(action, status, &body);
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                let details = Some(e.to_string());
                return ActionResult::failure(action, ActionError::NETWORK_ERROR, details);
            }
        };

        match serde_json::from_str::<ActionResult>(&body) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(action, error = %e, "action endpoint returned an unrecognized body");
                ActionResult::failure(action, ActionError::INVALID_RESPONSE, Some(e.to_string()))
            }
        }
    }
}

fn http_failure(action: &str, status: StatusCode, body: &str) -> ActionResult {
    let details = format!("{}: {}", status.as_u16(), body);
    ActionResult::failure(action, ActionError::HTTP_ERROR, Some(details))
}

pub struct HttpToolCaller {
    base_url: String,
    client: reqwest::Client,
}

impl HttpToolCaller {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: build_client(timeout),
        }
    }
}

#[async_trait]
impl ToolCaller for HttpToolCaller {
    async fn call_tool(&self, tool: &str, payload: &Value) -> Result<Value, ToolError> {
        let url = join(&self.base_url, &format!("tools/{tool}"));

        let resp = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_from_response(tool, status, body));
        }

        let body = resp.text().await.map_err(|e| ToolError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ToolError::Malformed(e.to_string()))
    }
}

fn error_from_response(tool: &str, status: StatusCode, body: String) -> ToolError {
    let parsed: Option<Value> = serde_json::from_str(&body).ok();

    match status {
        StatusCode::NOT_FOUND => ToolError::UnknownTool(tool.to_string()),
        StatusCode::UNPROCESSABLE_ENTITY => {
            let parsed = parsed.unwrap_or(Value::Null);
            if let Some(fields) = parsed["missingFields"].as_array() {
                return ToolError::MissingFields(
                    fields.iter().filter_map(Value::as_str).map(str::to_string).collect(),
                );
            }
            match parsed["field"].as_str() {
                Some(field) => {
                    ToolError::invalid(field, parsed["error"].as_str().unwrap_or("rejected"))
                }
                None => ToolError::Http {
                    status: status.as_u16(),
                    body,
                },
            }
        }
        _ => ToolError::Http {
            status: status.as_u16(),
            body,
        },
    }
}
