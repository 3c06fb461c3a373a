//! Error types for the OpenRouter adapter

use balikci_application::GatewayError;
use thiserror::Error;

/// Result type alias for OpenRouter operations
pub type Result<T> = std::result::Result<T, OpenRouterError>;

/// Errors that can occur when talking to the OpenRouter API
#[derive(Error, Debug)]
pub enum OpenRouterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API Error: {status} {reason}")]
    Api { status: u16, reason: String },

    /// The endpoint reported an error inside an otherwise successful body.
    #[error("API Error: {0}")]
    Remote(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("OpenRouter API key is not set (set OPENROUTER_API_KEY or [api] api_key)")]
    MissingApiKey,
}

impl From<OpenRouterError> for GatewayError {
    fn from(error: OpenRouterError) -> Self {
        match error {
            OpenRouterError::Http(e) if e.is_timeout() || e.is_connect() => {
                GatewayError::Connection(e.to_string())
            }
            OpenRouterError::Http(e) => GatewayError::Other(e.to_string()),
            OpenRouterError::Api { status, reason } => GatewayError::Api { status, reason },
            OpenRouterError::Serialization(e) => GatewayError::InvalidResponse(e.to_string()),
            OpenRouterError::UnexpectedResponse(msg) => GatewayError::InvalidResponse(msg),
            e @ (OpenRouterError::Remote(_) | OpenRouterError::MissingApiKey) => {
                GatewayError::Other(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status_line() {
        let err: GatewayError = OpenRouterError::Api {
            status: 429,
            reason: "Too Many Requests".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "API Error: 429 Too Many Requests");
    }

    #[test]
    fn test_missing_key_message_is_actionable() {
        let err: GatewayError = OpenRouterError::MissingApiKey.into();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }
}
