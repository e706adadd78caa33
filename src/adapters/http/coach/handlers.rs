//! HTTP handlers for coach endpoints.
//!
//! These handlers connect Axum routes to the application layer. They do
//! DTO mapping only; all conversation rules live in the domain.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::ContextTracker;
use crate::domain::foundation::SessionId;
use crate::ports::SessionStoreError;

use super::dto::{ErrorResponse, SendMessageRequest, SessionView, TurnView};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for coach handlers.
#[derive(Clone)]
pub struct CoachAppState {
    pub tracker: Arc<ContextTracker>,
}

impl CoachAppState {
    /// Creates a new CoachAppState.
    pub fn new(tracker: Arc<ContextTracker>) -> Self {
        Self { tracker }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/coach/message
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/coach/message - Run one conversational turn.
///
/// A blank or missing session id starts a fresh session; the generated
/// id is returned so the client can continue the conversation.
pub async fn send_message(
    State(state): State<CoachAppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, CoachApiError> {
    let session_id = request
        .session_id
        .as_deref()
        .and_then(SessionId::parse)
        .unwrap_or_else(SessionId::generate);

    let outcome = state
        .tracker
        .process_message(&session_id, &request.message)
        .await?;

    Ok((
        StatusCode::OK,
        Json(TurnView::from_outcome(&session_id, outcome)),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/coach/sessions/{id}
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/coach/sessions/{id} - Inspect a session.
///
/// # Errors
/// - 404 Not Found: No session exists under that id
pub async fn get_session(
    State(state): State<CoachAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, CoachApiError> {
    let session_id = SessionId::parse(&session_id)
        .ok_or_else(|| CoachApiError::BadRequest("Session id cannot be blank".to_string()))?;

    let session = state.tracker.snapshot(&session_id).await?;
    Ok((StatusCode::OK, Json(SessionView::from_session(&session))))
}

// ════════════════════════════════════════════════════════════════════════════════
// DELETE /api/coach/sessions/{id}
// ════════════════════════════════════════════════════════════════════════════════

/// DELETE /api/coach/sessions/{id} - Drop a session from the store.
///
/// Deleting an unknown id succeeds; the end state is the same.
pub async fn delete_session(
    State(state): State<CoachAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, CoachApiError> {
    let session_id = SessionId::parse(&session_id)
        .ok_or_else(|| CoachApiError::BadRequest("Session id cannot be blank".to_string()))?;

    state.tracker.delete(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum CoachApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SessionStoreError> for CoachApiError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => CoachApiError::NotFound(id.to_string()),
            other => CoachApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for CoachApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            CoachApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            CoachApiError::NotFound(id) => {
                (StatusCode::NOT_FOUND, ErrorResponse::not_found("Session", &id))
            }
            CoachApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal("An internal error occurred"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::coach::{FlowConfig, ResponseGenerator, SalesPhase};

    fn app_state() -> CoachAppState {
        let store = Arc::new(InMemorySessionStore::new());
        let generator = ResponseGenerator::new(Arc::new(FlowConfig::default()));
        CoachAppState::new(Arc::new(ContextTracker::new(store, generator)))
    }

    #[tokio::test]
    async fn send_message_runs_a_turn() {
        let state = app_state();
        let request = SendMessageRequest {
            session_id: Some("h-1".to_string()),
            message: "hello".to_string(),
        };

        let response = send_message(State(state.clone()), Json(request)).await;
        assert!(response.is_ok());

        let session = state
            .tracker
            .snapshot(&SessionId::parse("h-1").unwrap())
            .await
            .unwrap();
        assert_eq!(session.phase, SalesPhase::Intent);
        assert_eq!(session.history.len(), 2);
    }

    #[tokio::test]
    async fn send_message_generates_id_when_blank() {
        let state = app_state();
        let request = SendMessageRequest {
            session_id: Some("   ".to_string()),
            message: "hello".to_string(),
        };

        // A blank id behaves like a missing one: a fresh session.
        let response = send_message(State(state), Json(request)).await;
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn get_session_returns_not_found_for_unknown_id() {
        let state = app_state();
        let result = get_session(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(CoachApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_session_rejects_blank_id() {
        let state = app_state();
        let result = get_session(State(state), Path("  ".to_string())).await;
        assert!(matches!(result, Err(CoachApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn delete_session_is_idempotent() {
        let state = app_state();
        let result = delete_session(State(state), Path("never-existed".to_string())).await;
        assert!(result.is_ok());
    }

    #[test]
    fn store_errors_map_to_api_errors() {
        let not_found =
            SessionStoreError::NotFound(SessionId::parse("s-1").unwrap());
        assert!(matches!(
            CoachApiError::from(not_found),
            CoachApiError::NotFound(_)
        ));

        let backend = SessionStoreError::Backend("boom".to_string());
        assert!(matches!(
            CoachApiError::from(backend),
            CoachApiError::Internal(_)
        ));
    }
}
