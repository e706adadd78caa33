//! Axum routes for coach endpoints.
//!
//! Defines the routing table for the coach HTTP surface.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{delete_session, get_session, health, send_message, CoachAppState};

/// Creates routes for coach endpoints.
///
/// REST Endpoints:
/// - POST /api/coach/message - Run one conversational turn
/// - GET /api/coach/sessions/:session_id - Inspect a session
/// - DELETE /api/coach/sessions/:session_id - Drop a session
pub fn coach_routes() -> Router<CoachAppState> {
    Router::new()
        .route("/coach/message", post(send_message))
        .route(
            "/coach/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
}

/// Combined router: coach routes under /api plus the health probe.
pub fn coach_router() -> Router<CoachAppState> {
    Router::new()
        .nest("/api", coach_routes())
        .route("/health", get(health))
}
