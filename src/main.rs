use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use servicecall::config::AppConfig;
use servicecall::db;
use servicecall::handlers;
use servicecall::services::clock::{SystemClock, UuidGenerator};
use servicecall::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        timezone = %config.timezone,
        hours = %config.business_hours.to_human_readable(),
        "loaded configuration"
    );

    let conn = db::init_db(&config.database_url)?;
    let state = Arc::new(AppState::new(
        conn,
        config.clone(),
        Arc::new(SystemClock),
        Arc::new(UuidGenerator),
    ));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/actions/dispatch", post(handlers::actions::dispatch_action))
        .route("/tools/:tool_name", post(handlers::tools::call_tool))
        .route("/api/cards/extract", post(handlers::cards::extract_cards))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
