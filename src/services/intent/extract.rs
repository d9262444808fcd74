use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::Value;

use super::markup::{self, Block};
use super::registry;
use crate::models::card::CardIntent;
use crate::services::clock::{Clock, IdGenerator, SystemClock, UuidGenerator};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResult {
    pub clean_text: String,
    pub cards: Vec<CardIntent>,
    pub errors: Vec<String>,
}

/// Pulls card intent blocks out of assistant text.
///
/// Every recognised block is removed from the display text, including blocks
/// that fail to parse or validate; those are reported in `errors` instead.
pub struct IntentExtractor {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for IntentExtractor {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidGenerator))
    }
}

impl IntentExtractor {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }

    pub fn extract(&self, text: &str) -> ExtractResult {
        self.extract_in_thread(text, None)
    }

    /// Like [`extract`](Self::extract), but cards without a `threadId` are
    /// tagged with `thread_id`.
    pub fn extract_in_thread(&self, text: &str, thread_id: Option<&str>) -> ExtractResult {
        let mut cards = Vec::new();
        let mut errors = Vec::new();

        // Always take the earliest block in the current text and rescan from
        // the start, since cutting a block can splice a new one together.
        let mut current = text.to_string();
        while let Some(block) = markup::next_block(&current, 0) {
            match self.parse_block(&current, &block, thread_id) {
                Ok(card) => cards.push(card),
                Err(err) => {
                    tracing::warn!(
                        syntax = block.syntax.as_str(),
                        error = %err,
                        "dropped card intent block"
                    );
                    errors.push(err);
                }
            }

            let mut spliced = String::with_capacity(current.len());
            push_span(&mut spliced, &current[..block.start], false);
            push_span(&mut spliced, &current[block.end..], true);
            current = spliced;
        }

        if !errors.is_empty() {
            tracing::debug!(
                cards = cards.len(),
                errors = errors.len(),
                "card intent extraction had errors"
            );
        }

        ExtractResult {
            clean_text: collapse_blank_lines(&current).trim().to_string(),
            cards,
            errors,
        }
    }

    fn parse_block(
        &self,
        text: &str,
        block: &Block,
        thread_id: Option<&str>,
    ) -> Result<CardIntent, String> {
        let syntax = block.syntax.as_str();
        let mut value: Value = serde_json::from_str(block.payload(text))
            .map_err(|e| format!("{syntax} card intent is not valid JSON: {e}"))?;

        // Blank base fields count as absent and get filled in.
        if let Some(obj) = value.as_object_mut() {
            if obj.get("id").map_or(true, is_blank) {
                obj.insert("id".to_string(), Value::from(self.ids.next_id()));
            }
            if obj.get("createdAt").map_or(true, is_blank) {
                let now = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
                obj.insert("createdAt".to_string(), Value::from(now));
            }
            if let Some(thread_id) = thread_id {
                if obj.get("threadId").map_or(true, is_blank) {
                    obj.insert("threadId".to_string(), Value::from(thread_id));
                }
            }
        }

        registry::validate_card(value).map_err(|e| format!("{syntax} card intent rejected: {e}"))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Appends a span of surviving text. A span that follows a removed block
/// drops its leading spaces when the output already ends in whitespace, so
/// "a <block> b" reads "a b".
fn push_span(cleaned: &mut String, span: &str, after_block: bool) {
    if after_block && (cleaned.is_empty() || cleaned.ends_with(char::is_whitespace)) {
        cleaned.push_str(span.trim_start_matches([' ', '\t']));
    } else {
        cleaned.push_str(span);
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(ch);
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out
}
