//! Server binary: wires configuration, the engine, and the HTTP adapter.

use std::sync::Arc;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pitch_coach::adapters::http::coach::{coach_router, CoachAppState};
use pitch_coach::adapters::storage::InMemorySessionStore;
use pitch_coach::application::ContextTracker;
use pitch_coach::config::AppConfig;
use pitch_coach::domain::coach::ResponseGenerator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app_config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(app_config.server.log_level.clone())),
        )
        .init();

    app_config.validate()?;
    let flow = Arc::new(app_config.load_flow()?);
    tracing::info!(
        phases = flow.phases.len(),
        intents = flow.keywords.intents.len(),
        "flow configuration loaded"
    );

    let store = Arc::new(InMemorySessionStore::new());
    let generator = ResponseGenerator::new(Arc::clone(&flow));
    let tracker = Arc::new(ContextTracker::new(store, generator));
    let state = CoachAppState::new(tracker);

    let app = coach_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    app_config.server.request_timeout_secs,
                )))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let addr = app_config.server.socket_addr()?;
    tracing::info!(%addr, "pitch-coach listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
