pub mod direct;
pub mod http;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::errors::ToolError;
use crate::models::action::{
    ActionContext, ActionError, ActionOutput, ActionResult, DispatchRequest,
};
use crate::models::card::{CardBody, CardIntent, LeadCard, Priority, CARD_VERSION};
use crate::services::clock::{Clock, IdGenerator};

use self::http::HttpActionClient;

// Actions that skip the remote endpoint and call a booking tool.
pub const DIRECT_TOOL_ACTIONS: &[&str] =
    &["book_service_call", "lookup_customer", "check_service_area"];

#[async_trait]
pub trait ToolCaller: Send + Sync {
    async fn call_tool(&self, tool: &str, payload: &Value) -> Result<Value, ToolError>;
}

/// Routes a card action to a tool or the remote action endpoint. Every
/// outcome, including transport failure, comes back as an [`ActionResult`].
pub struct ActionDispatcher {
    tools: Arc<dyn ToolCaller>,
    remote: HttpActionClient,
}

impl ActionDispatcher {
    pub fn new(tools: Arc<dyn ToolCaller>, remote: HttpActionClient) -> Self {
        Self { tools, remote }
    }

    pub fn is_direct(action: &str) -> bool {
        DIRECT_TOOL_ACTIONS.contains(&action)
    }

    pub async fn dispatch(
        &self,
        action: &str,
        payload: Map<String, Value>,
        context: &ActionContext,
    ) -> ActionResult {
        let direct = Self::is_direct(action);
        tracing::info!(action, thread_id = %context.thread_id, direct, "dispatching action");

        let result = if direct {
            match self.tools.call_tool(action, &Value::Object(payload)).await {
                Ok(output) => normalize_tool_output(action, output),
                Err(e) => tool_error_result(action, e),
            }
        } else {
            let request = DispatchRequest {
                action: action.to_string(),
                payload,
                context: context.clone(),
            };
            self.remote.dispatch(&request).await
        };

        match result.error_code() {
            None => {
                tracing::info!(action, correlation_id = %result.correlation_id, "action succeeded")
            }
            Some(code) => tracing::warn!(action, code, "action failed"),
        }
        result
    }

    /// Like [`dispatch`](Self::dispatch), but gives up as soon as `cancel`
    /// fires. `None` means the result was discarded.
    pub async fn dispatch_cancellable(
        &self,
        action: &str,
        payload: Map<String, Value>,
        context: &ActionContext,
        cancel: &CancellationToken,
    ) -> Option<ActionResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(action, "action cancelled, discarding result");
                None
            }
            result = self.dispatch(action, payload, context) => Some(result),
        }
    }
}

// Message: first non-empty of summary, nextSteps, message, error.
pub fn normalize_tool_output(action: &str, output: Value) -> ActionResult {
    let text = |key: &str| {
        output
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let message = ["summary", "nextSteps", "message", "error"]
        .into_iter()
        .find_map(|key| text(key))
        .unwrap_or_else(|| format!("{} completed.", action.replace('_', " ")));
    let correlation_id = text("correlationId").unwrap_or_default();
    let external_id = text("externalId")
        .or_else(|| (!correlation_id.is_empty()).then(|| correlation_id.clone()));

    ActionResult::success(
        action,
        correlation_id,
        ActionOutput {
            message,
            external_id,
            data: Some(output),
        },
    )
}

pub fn tool_error_result(action: &str, err: ToolError) -> ActionResult {
    let details = Some(err.to_string());
    let code = match &err {
        ToolError::MissingFields(_) | ToolError::Invalid { .. } => ActionError::VALIDATION_ERROR,
        ToolError::Http { .. } => ActionError::HTTP_ERROR,
        ToolError::Network(_) => ActionError::NETWORK_ERROR,
        ToolError::UnknownTool(_) => ActionError::UNKNOWN_ACTION,
        ToolError::Malformed(_) | ToolError::Storage(_) => ActionError::TOOL_ERROR,
    };

    let result = ActionResult::failure(action, code, details);
    match err {
        ToolError::MissingFields(fields) => result.with_missing_fields(fields),
        _ => result,
    }
}

/// Builds the "call us" lead card shown in place of a failed action.
pub struct FallbackCards {
    contact_phone: String,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl FallbackCards {
    pub fn new(
        contact_phone: impl Into<String>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            contact_phone: contact_phone.into(),
            clock,
            ids,
        }
    }

    pub fn for_result(&self, result: &ActionResult, context: &ActionContext) -> Option<CardIntent> {
        let mut card = fallback_card(
            result,
            &self.contact_phone,
            self.clock.as_ref(),
            self.ids.as_ref(),
        )?;
        card.thread_id = Some(context.thread_id.clone()).filter(|t| !t.is_empty());
        Some(card)
    }
}

/// The lead card to render in place of a failed action. `None` for
/// successful results.
pub fn fallback_card(
    result: &ActionResult,
    business_phone: &str,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Option<CardIntent> {
    if result.ok {
        return None;
    }
    Some(CardIntent {
        id: ids.next_id(),
        version: CARD_VERSION.to_string(),
        priority: Priority::High,
        title: Some("Let's get you help".to_string()),
        created_at: clock.now(),
        thread_id: None,
        body: CardBody::LeadCard(LeadCard {
            message: Some(format!(
                "We couldn't finish that just now. \
                 Call us at {business_phone} and we'll get you taken care of."
            )),
            prefill: None,
        }),
    })
}
