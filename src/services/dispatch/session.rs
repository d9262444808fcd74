use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use super::{ActionDispatcher, FallbackCards};
use crate::models::action::{ActionContext, ActionError, ActionResult};
use crate::models::card::CardIntent;

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub result: ActionResult,
    pub fallback: Option<CardIntent>,
}

/// Tracks in-flight actions for one conversation view. Each card has at
/// most one running action, and closing the session cancels them all.
pub struct ActionSession {
    dispatcher: Arc<ActionDispatcher>,
    fallback: FallbackCards,
    token: CancellationToken,
    in_flight: Mutex<HashMap<String, CancellationToken>>,
}

impl ActionSession {
    pub fn new(dispatcher: Arc<ActionDispatcher>, fallback: FallbackCards) -> Self {
        Self {
            dispatcher,
            fallback,
            token: CancellationToken::new(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_loading(&self, card_id: &str) -> bool {
        self.in_flight().contains_key(card_id)
    }

    /// Cancels the action running for `card_id`, if any.
    pub fn cancel(&self, card_id: &str) -> bool {
        match self.in_flight().get(card_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn close(&self) {
        tracing::debug!(in_flight = self.in_flight().len(), "closing action session");
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs `action` on behalf of `card_id`. Returns `None` when the
    /// session was closed or the action was cancelled before it finished.
    pub async fn run(
        &self,
        card_id: &str,
        action: &str,
        payload: Map<String, Value>,
        context: &ActionContext,
    ) -> Option<ActionOutcome> {
        if self.is_closed() {
            return None;
        }

        let token = {
            let mut in_flight = self.in_flight();
            if in_flight.contains_key(card_id) {
                let result = ActionResult::failure(
                    action,
                    ActionError::ACTION_IN_FLIGHT,
                    Some(format!("card {card_id} already has an action running")),
                );
                return Some(ActionOutcome { result, fallback: None });
            }
            let token = self.token.child_token();
            in_flight.insert(card_id.to_string(), token.clone());
            token
        };
        let _loading = LoadingGuard { session: self, card_id };

        let result = self
            .dispatcher
            .dispatch_cancellable(action, payload, context, &token)
            .await?;
        let fallback = self.fallback.for_result(&result, context);
        Some(ActionOutcome { result, fallback })
    }
}

/// Clears the loading flag even when the `run` future is dropped.
struct LoadingGuard<'a> {
    session: &'a ActionSession,
    card_id: &'a str,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight().remove(self.card_id);
    }
}
