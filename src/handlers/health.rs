use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    let db_ok = state
        .db
        .lock()
        .map(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok())
        .unwrap_or(false);

    if db_ok {
        (StatusCode::OK, "ok")
    } else {
        tracing::error!("health check failed: database unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}
