//! Session-state tracking and the per-turn pipeline entry point.
//!
//! `ContextTracker` owns keyed access to session state: it auto-creates
//! sessions on first contact, exposes the mutate/read operations the
//! engine contract requires, and serializes overlapping turns for the
//! same session id with an in-process lock so concurrent requests cannot
//! lose updates. Different sessions proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::coach::{
    MessageRole, PhaseAdvance, ResponseGenerator, Session, TurnOutcome,
};
use crate::domain::foundation::SessionId;
use crate::ports::{SessionStore, SessionStoreError};

/// Tracks per-session conversation state and runs turns against it.
pub struct ContextTracker {
    store: Arc<dyn SessionStore>,
    generator: ResponseGenerator,
    // Per-session turn locks. Grows with the session population, like
    // the in-memory store itself.
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl ContextTracker {
    /// Creates a tracker over a store and a configured generator.
    pub fn new(store: Arc<dyn SessionStore>, generator: ResponseGenerator) -> Self {
        Self {
            store,
            generator,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the existing session for `id`, or initializes a new one
    /// at the first phase with empty captures and history.
    ///
    /// Idempotent by session id.
    pub async fn create_or_get(&self, id: &SessionId) -> Result<Session, SessionStoreError> {
        match self.store.get(id).await {
            Ok(session) => Ok(session),
            Err(SessionStoreError::NotFound(_)) => {
                let session = Session::new(id.clone());
                self.store.put(&session).await?;
                tracing::debug!(session_id = %id, "session created");
                Ok(session)
            }
            Err(err) => Err(err),
        }
    }

    /// Runs one conversational turn for the session.
    ///
    /// Unknown session ids yield a freshly initialized session rather
    /// than an error. Turns for the same session id are serialized.
    pub async fn process_message(
        &self,
        id: &SessionId,
        message: &str,
    ) -> Result<TurnOutcome, SessionStoreError> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut session = self.create_or_get(id).await?;
        let outcome = self.generator.generate(&mut session, message);
        self.store.put(&session).await?;
        Ok(outcome)
    }

    /// Appends a timestamped message to the session's history,
    /// auto-creating the session if needed.
    pub async fn add_message(
        &self,
        id: &SessionId,
        role: MessageRole,
        text: &str,
    ) -> Result<(), SessionStoreError> {
        let mut session = self.create_or_get(id).await?;
        session.add_message(role, text);
        self.store.put(&session).await
    }

    /// Stores a captured fact (last-write-wins).
    pub async fn set_capture(
        &self,
        id: &SessionId,
        key: &str,
        value: &str,
    ) -> Result<(), SessionStoreError> {
        let mut session = self.create_or_get(id).await?;
        session.set_capture(key, value);
        self.store.put(&session).await
    }

    /// Returns the session's capture map.
    pub async fn captures(
        &self,
        id: &SessionId,
    ) -> Result<HashMap<String, String>, SessionStoreError> {
        Ok(self.create_or_get(id).await?.captures)
    }

    /// Advances the session one phase forward; a no-op at the terminal
    /// phase.
    pub async fn advance_phase(&self, id: &SessionId) -> Result<PhaseAdvance, SessionStoreError> {
        let mut session = self.create_or_get(id).await?;
        let outcome = session.advance_phase();
        self.store.put(&session).await?;
        Ok(outcome)
    }

    /// Shifts the session's commitment temperature, clamped to [0, 1].
    pub async fn adjust_temperature(
        &self,
        id: &SessionId,
        delta: f64,
    ) -> Result<(), SessionStoreError> {
        let mut session = self.create_or_get(id).await?;
        session.adjust_temperature(delta);
        self.store.put(&session).await
    }

    /// Returns the stored session, without auto-creating.
    pub async fn snapshot(&self, id: &SessionId) -> Result<Session, SessionStoreError> {
        self.store.get(id).await
    }

    /// Removes a session from the store.
    pub async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.locks.lock().await.remove(id);
        self.store.delete(id).await
    }

    async fn lock_for(&self, id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
