//! Conversation messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Trainee input.
    User,
    /// Coach response.
    Coach,
}

/// A single timestamped entry in a session's message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub text: String,
    /// When the message was recorded.
    pub timestamp: Timestamp,
}

impl ConversationMessage {
    /// Creates a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Creates a coach message stamped with the current time.
    pub fn coach(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Coach,
            text: text.into(),
            timestamp: Timestamp::now(),
        }
    }
}
