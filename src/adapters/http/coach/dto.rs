//! HTTP DTOs for coach endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::coach::{SalesPhase, Session, TurnOutcome};
use crate::domain::foundation::SessionId;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body for POST /api/coach/message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Session to continue. Absent or blank ids start a fresh session.
    #[serde(default)]
    pub session_id: Option<String>,
    /// The trainee's utterance.
    pub message: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// View of one turn's outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnView {
    /// Session id the turn ran against (generated if none was supplied).
    pub session_id: String,
    /// The coach's response text.
    pub message: String,
    /// Phase after this turn.
    pub phase: SalesPhase,
    /// Human-readable phase label.
    pub phase_label: String,
    /// Capture snapshot after this turn.
    pub captures: HashMap<String, String>,
    /// Composite answer score for this turn.
    pub score: f64,
    /// True when this turn's gate passed.
    pub phase_complete: bool,
    /// Detected intent category, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// True when the input signalled readiness to move forward.
    pub transition_ready: bool,
    /// Commitment temperature after this turn.
    pub temperature: f64,
}

impl TurnView {
    /// Builds a view from a turn outcome.
    pub fn from_outcome(session_id: &SessionId, outcome: TurnOutcome) -> Self {
        Self {
            session_id: session_id.to_string(),
            message: outcome.message,
            phase: outcome.phase,
            phase_label: outcome.phase.label().to_string(),
            captures: outcome.captures,
            score: outcome.score.value(),
            phase_complete: outcome.phase_complete,
            intent: outcome.intent,
            transition_ready: outcome.transition_ready,
            temperature: outcome.temperature.value(),
        }
    }
}

/// View of a stored session for analytics and inspection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Session id.
    pub session_id: String,
    /// Current phase.
    pub phase: SalesPhase,
    /// Human-readable phase label.
    pub phase_label: String,
    /// Capture snapshot.
    pub captures: HashMap<String, String>,
    /// Commitment temperature.
    pub temperature: f64,
    /// Total messages in the history.
    pub message_count: u32,
    /// Per-turn composite scores, oldest first.
    pub score_history: Vec<f64>,
    /// When the session was created.
    pub created_at: String,
    /// When the session last changed.
    pub updated_at: String,
}

impl SessionView {
    /// Builds a view from a session.
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id.to_string(),
            phase: session.phase,
            phase_label: session.phase.label().to_string(),
            captures: session.captures.clone(),
            temperature: session.temperature.value(),
            message_count: session.history.len() as u32,
            score_history: session.score_history.iter().map(|s| s.value()).collect(),
            created_at: session.created_at.as_datetime().to_rfc3339(),
            updated_at: session.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Error payload returned by all coach endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorResponse {
    /// Builds a bad-request payload.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    /// Builds a not-found payload.
    pub fn not_found(resource: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource, id),
        }
    }

    /// Builds an internal-error payload.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}
