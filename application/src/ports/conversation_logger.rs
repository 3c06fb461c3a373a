//! Port for structured conversation logging.
//!
//! Records what happened in each turn (messages sent and received, failures,
//! cancellations, clears) to a machine-readable transcript. This is separate
//! from `tracing`: tracing carries human-readable diagnostics, this port
//! carries the conversation itself.

use balikci_domain::Message;
use serde_json::{Value, json};

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (e.g. "user_message", "request_failed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn user_message(message: &Message) -> Self {
        Self::new(
            "user_message",
            json!({
                "content": message.content,
                "message_timestamp": message.timestamp,
            }),
        )
    }

    pub fn assistant_message(model: &str, message: &Message) -> Self {
        Self::new(
            "assistant_message",
            json!({
                "model": model,
                "content": message.content,
                "bytes": message.content.len(),
                "has_reasoning": message.reasoning_details.is_some(),
            }),
        )
    }

    pub fn request_failed(model: &str, error: &str) -> Self {
        Self::new("request_failed", json!({ "model": model, "error": error }))
    }

    pub fn request_cancelled(partial_bytes: usize) -> Self {
        Self::new(
            "request_cancelled",
            json!({ "partial_bytes": partial_bytes }),
        )
    }

    pub fn conversation_cleared(messages: usize) -> Self {
        Self::new("conversation_cleared", json!({ "messages": messages }))
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible; a failing logger must never break
/// the chat.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
