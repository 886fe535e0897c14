//! Per-request context handed to agents.
//!
//! Context is supplied by the caller with every request. Agents read it but
//! never keep it between requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One earlier turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// A memory the caller considers relevant to the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReference {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub relevance: Option<f32>,
}

/// Context supplied alongside an [`AgentRequest`](crate::AgentRequest).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Identity forwarded to the memory service as `X-User-ID`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub conversation_history: Vec<ConversationMessage>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub memory_context: Vec<MemoryReference>,

    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub metadata: Map<String, Value>,
}

impl AgentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying only a user identity.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_message(mut self, message: ConversationMessage) -> Self {
        self.conversation_history.push(message);
        self
    }

    pub fn with_memory(mut self, memory: MemoryReference) -> Self {
        self.memory_context.push(memory);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The most recent user message, if any.
    pub fn last_user_message(&self) -> Option<&ConversationMessage> {
        self.conversation_history
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
    }
}
