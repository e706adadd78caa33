//! Session aggregate: all mutable state for one ongoing conversation.
//!
//! A session is created on the first message for a new session id and
//! lives in whatever store the hosting layer provides. Everything needed
//! to resume a conversation is on this struct and serializes with serde,
//! so a reloaded session behaves identically to an uninterrupted one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Score, SessionId, Temperature, Timestamp};

use super::message::{ConversationMessage, MessageRole};
use super::phase::{PhaseSequence, SalesPhase};

/// Outcome of a phase advancement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAdvance {
    /// The session moved to the given phase.
    Advanced(SalesPhase),
    /// The session is already at the terminal phase; nothing changed.
    AlreadyTerminal,
}

/// All state for one ongoing training conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier supplied by the hosting layer.
    pub id: SessionId,
    /// Current phase of the methodology.
    pub phase: SalesPhase,
    /// Whether the current phase's opening question has been asked.
    pub phase_opened: bool,
    /// Facts captured from the trainee's language, keyed semantically.
    pub captures: HashMap<String, String>,
    /// Ordered message history. Grows without bound; eviction is the
    /// store's concern, not the session's.
    pub history: Vec<ConversationMessage>,
    /// Running commitment signal.
    pub temperature: Temperature,
    /// Per-turn composite scores, retained for analytics.
    pub score_history: Vec<Score>,
    /// When the session was created.
    pub created_at: Timestamp,
    /// When the session last changed.
    pub updated_at: Timestamp,
}

impl Session {
    /// Creates a fresh session at the first phase with empty state.
    pub fn new(id: SessionId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            phase: PhaseSequence::first(),
            phase_opened: false,
            captures: HashMap::new(),
            history: Vec::new(),
            temperature: Temperature::NEUTRAL,
            score_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a timestamped message to the history.
    pub fn add_message(&mut self, role: MessageRole, text: impl Into<String>) {
        let message = match role {
            MessageRole::User => ConversationMessage::user(text),
            MessageRole::Coach => ConversationMessage::coach(text),
        };
        self.history.push(message);
        self.touch();
    }

    /// Stores a captured fact. Later writes for the same key overwrite
    /// earlier ones. Values are trimmed; a blank value is not stored.
    pub fn set_capture(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.captures.insert(key.into(), trimmed.to_string());
        self.touch();
    }

    /// Returns the capture for `key`, if present.
    pub fn capture(&self, key: &str) -> Option<&str> {
        self.captures.get(key).map(|v| v.as_str())
    }

    /// Returns true if a non-empty capture exists for `key`.
    pub fn has_capture(&self, key: &str) -> bool {
        self.captures
            .get(key)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    /// Moves to the next phase in the fixed ordering.
    ///
    /// The opening-question pointer resets so the new phase greets the
    /// trainee before probing. At the terminal phase this is a no-op.
    pub fn advance_phase(&mut self) -> PhaseAdvance {
        match PhaseSequence::next(self.phase) {
            Some(next) => {
                self.phase = next;
                self.phase_opened = false;
                self.touch();
                PhaseAdvance::Advanced(next)
            }
            None => PhaseAdvance::AlreadyTerminal,
        }
    }

    /// Marks the current phase's opening question as asked.
    pub fn mark_phase_opened(&mut self) {
        self.phase_opened = true;
        self.touch();
    }

    /// Returns true if the current phase still needs its opening question.
    pub fn needs_opening(&self) -> bool {
        !self.phase_opened
    }

    /// Shifts the commitment temperature by `delta`, clamped to [0, 1].
    pub fn adjust_temperature(&mut self, delta: f64) {
        self.temperature = self.temperature.adjusted(delta);
        self.touch();
    }

    /// Records a per-turn score for analytics.
    pub fn record_score(&mut self, score: Score) {
        self.score_history.push(score);
        self.touch();
    }

    /// Returns the most recent recorded score, if any.
    pub fn latest_score(&self) -> Option<Score> {
        self.score_history.last().copied()
    }

    /// Returns the number of user messages in the history.
    pub fn user_message_count(&self) -> usize {
        self.history
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count()
    }

    /// Returns true if the session has reached the terminal phase.
    pub fn is_at_terminal_phase(&self) -> bool {
        PhaseSequence::is_last(self.phase)
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
