//! Message model representing one turn in a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An assistant reply, normalized by the response parser.
///
/// The completion endpoint gives no advance guarantee of shape: sometimes
/// it emits clean JSON with recognized fields, sometimes prose with code
/// fences, sometimes an error envelope. The parser folds all of these
/// into one of these variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// A reply carrying recognized structured fields.
    Structured {
        /// Narrative response text.
        response: String,
        /// Conversational aside, separate from the narrative.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        small_talk: Option<String>,
        /// Code excerpt.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// The full parsed JSON payload the reply arrived as.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        json_data: Option<Value>,
    },
    /// Freeform narrative text (may itself contain fenced code blocks).
    Plain {
        /// The raw reply text.
        text: String,
    },
    /// An error reported by the provider or raised while sending.
    Error {
        /// User-facing description of what went wrong.
        message: String,
    },
}

impl Reply {
    /// Narrative text of the reply, if any.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Structured { response, .. } => Some(response),
            Self::Plain { text } => Some(text),
            Self::Error { .. } => None,
        }
    }

    /// Small-talk aside, if the reply carries one.
    pub fn small_talk(&self) -> Option<&str> {
        match self {
            Self::Structured { small_talk, .. } => small_talk.as_deref(),
            _ => None,
        }
    }

    /// Code excerpt, if the reply carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Structured { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Error text, if this is an error reply.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }

    /// The raw JSON payload, when the reply arrived as JSON.
    pub fn json_data(&self) -> Option<&Value> {
        match self {
            Self::Structured { json_data, .. } => json_data.as_ref(),
            _ => None,
        }
    }
}

/// The body of a message, keyed by who authored it.
///
/// A turn is either user content or an assistant reply, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MessageBody {
    /// A turn authored by the user.
    User {
        /// What the user typed.
        content: String,
    },
    /// A turn authored by the assistant.
    Assistant {
        /// The parsed reply.
        reply: Reply,
    },
}

/// One turn in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier (`UUIDv7`, time-ordered).
    pub id: String,
    /// When the turn was created.
    pub timestamp: DateTime<Utc>,
    /// Who authored the turn and what it says.
    #[serde(flatten)]
    pub body: MessageBody,
}

impl ChatMessage {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            body: MessageBody::User {
                content: content.into(),
            },
        }
    }

    /// Create an assistant turn from a parsed reply.
    pub fn assistant(reply: Reply) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            body: MessageBody::Assistant { reply },
        }
    }

    /// Whether this turn was authored by the user.
    pub const fn is_user(&self) -> bool {
        matches!(self.body, MessageBody::User { .. })
    }

    /// The user content, when this is a user turn.
    pub fn user_content(&self) -> Option<&str> {
        match &self.body {
            MessageBody::User { content } => Some(content),
            MessageBody::Assistant { .. } => None,
        }
    }

    /// The parsed reply, when this is an assistant turn.
    pub const fn reply(&self) -> Option<&Reply> {
        match &self.body {
            MessageBody::Assistant { reply } => Some(reply),
            MessageBody::User { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_round_trip() {
        let msg = ChatMessage::user("hello there");
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
        assert!(back.is_user());
        assert_eq!(back.user_content(), Some("hello there"));
        assert!(back.reply().is_none());
    }

    #[test]
    fn assistant_message_round_trip() {
        let msg = ChatMessage::assistant(Reply::Structured {
            response: "hi".to_string(),
            small_talk: Some("nice weather".to_string()),
            code: Some("print(1)".to_string()),
            json_data: Some(serde_json::json!({"response": "hi"})),
        });
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
        assert!(!back.is_user());
        let reply = back.reply().unwrap();
        assert_eq!(reply.response_text(), Some("hi"));
        assert_eq!(reply.small_talk(), Some("nice weather"));
        assert_eq!(reply.code(), Some("print(1)"));
        assert!(reply.error().is_none());
    }

    #[test]
    fn serialized_role_tag_is_lowercase() {
        let user = serde_json::to_value(ChatMessage::user("x")).unwrap();
        assert_eq!(user["role"], "user");
        let assistant = serde_json::to_value(ChatMessage::assistant(Reply::Plain {
            text: "y".to_string(),
        }))
        .unwrap();
        assert_eq!(assistant["role"], "assistant");
    }

    #[test]
    fn error_reply_accessors() {
        let reply = Reply::Error {
            message: "bad key".to_string(),
        };
        assert_eq!(reply.error(), Some("bad key"));
        assert!(reply.response_text().is_none());
        assert!(reply.code().is_none());
        assert!(reply.small_talk().is_none());
    }
}
