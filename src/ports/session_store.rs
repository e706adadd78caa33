//! Session Store Port - Interface for persisting session state.
//!
//! The engine itself is storage-agnostic; this port defines how sessions
//! are saved and loaded so the in-memory adapter can be swapped for a
//! bounded cache or an external store without touching engine logic.

use async_trait::async_trait;

use crate::domain::coach::Session;
use crate::domain::foundation::SessionId;

/// Errors that can occur during session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Port for persisting and loading sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Saves a session, replacing any previous state for its id.
    async fn put(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Loads a session by id.
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists.
    async fn get(&self, id: &SessionId) -> Result<Session, SessionStoreError>;

    /// Deletes a session. Deleting an unknown id is a no-op.
    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Lists the ids of all stored sessions.
    async fn list(&self) -> Result<Vec<SessionId>, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_names_the_session() {
        let id = SessionId::parse("missing-session").unwrap();
        let err = SessionStoreError::NotFound(id);
        assert!(err.to_string().contains("missing-session"));
    }

    #[test]
    fn backend_error_carries_detail() {
        let err = SessionStoreError::Backend("disk full".to_string());
        assert!(err.to_string().contains("disk full"));
    }
}
