//! Session model representing one persisted conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChatMessage;

/// Title given to a session before it has any messages.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum number of characters of the first message used for a title.
pub const TITLE_MAX_CHARS: usize = 30;

/// One conversation: an ordered list of messages plus metadata.
///
/// The title is derived, never user-set: it tracks the first message of
/// the conversation and is recomputed whenever the message list changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier (`UUIDv7`, time-ordered).
    pub id: String,
    /// Human-readable title derived from the first message.
    pub title: String,
    /// Messages in conversation order (append-only during a conversation).
    pub messages: Vec<ChatMessage>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session with the default title.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a display title from a message list.
    ///
    /// Only a user-authored first message produces a title; anything else
    /// (empty list, assistant-first) keeps the default. Long titles are
    /// truncated with an ellipsis marker.
    pub fn derive_title(messages: &[ChatMessage]) -> String {
        let Some(content) = messages.first().and_then(ChatMessage::user_content) else {
            return DEFAULT_TITLE.to_string();
        };
        if content.chars().count() > TITLE_MAX_CHARS {
            let truncated: String = content.chars().take(TITLE_MAX_CHARS).collect();
            format!("{truncated}...")
        } else {
            content.to_string()
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
