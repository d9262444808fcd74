use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::card::CardIntent;
use crate::services::intent::is_card_intent_complete;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub text: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub clean_text: String,
    pub cards: Vec<CardIntent>,
    pub errors: Vec<String>,
    pub complete: bool,
}

// POST /api/cards/extract
pub async fn extract_cards(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    let complete = is_card_intent_complete(&req.text);
    let result = state.extractor.extract_in_thread(&req.text, req.thread_id.as_deref());

    Json(ExtractResponse {
        clean_text: result.clean_text,
        cards: result.cards,
        errors: result.errors,
        complete,
    })
}
