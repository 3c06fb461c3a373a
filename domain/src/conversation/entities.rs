//! Conversation entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
///
/// `timestamp` is milliseconds since the Unix epoch. Histories written by
/// older clients may lack it, so it stays optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Opaque reasoning trace returned by reasoning models; echoed back on
    /// the next request so the model can continue from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<Value>,
}

impl Message {
    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
            reasoning_details: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::now(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }

    /// Attach reasoning details (ignored for `null`).
    pub fn with_reasoning(mut self, details: Option<Value>) -> Self {
        self.reasoning_details = details.filter(|v| !v.is_null());
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Ordered chat history (Entity)
///
/// Messages are only ever appended or wiped as a whole, so index order is
/// chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Parse a persisted history (a JSON array of messages).
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str::<Vec<Message>>(raw)
            .map(Self::from_messages)
            .map_err(|e| DomainError::MalformedHistory(e.to_string()))
    }

    /// Serialize to the persisted form.
    pub fn to_json(&self) -> String {
        // Vec<Message> has only string keys and JSON values; this cannot fail.
        serde_json::to_string(&self.messages).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
