//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Malformed conversation history: {0}")]
    MalformedHistory(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        assert_eq!(DomainError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::EmptyMessage.is_cancelled());
        assert!(!DomainError::MalformedHistory("eof".to_string()).is_cancelled());
    }

    #[test]
    fn test_malformed_history_display() {
        let error = DomainError::MalformedHistory("expected value".to_string());
        assert_eq!(
            error.to_string(),
            "Malformed conversation history: expected value"
        );
    }
}
