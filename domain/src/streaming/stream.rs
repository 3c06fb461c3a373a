//! Streaming events for completion responses.
//!
//! [`StreamEvent`] bridges infrastructure-level streaming (SSE chunks from
//! the completion endpoint) to the application layer, so partial text can be
//! rendered while the model is still generating.

use serde_json::Value;

/// An event in a streaming completion response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// Reasoning details attached to the response. Later values replace
    /// earlier ones.
    Reasoning(Value),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_text_returns_content() {
        let event = StreamEvent::Delta("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn completed_text_returns_content_and_is_terminal() {
        let event = StreamEvent::Completed("full response".to_string());
        assert_eq!(event.text(), Some("full response"));
        assert!(event.is_terminal());
    }

    #[test]
    fn error_and_reasoning_have_no_text() {
        let error = StreamEvent::Error("oops".to_string());
        assert_eq!(error.text(), None);
        assert!(error.is_terminal());

        let reasoning = StreamEvent::Reasoning(serde_json::json!([]));
        assert_eq!(reasoning.text(), None);
        assert!(!reasoning.is_terminal());
    }
}
