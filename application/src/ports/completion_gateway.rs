//! Completion gateway port
//!
//! Defines the interface for requesting completions from a hosted model.

use async_trait::async_trait;
use balikci_domain::{Model, PromptMessage, StreamEvent};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-success HTTP status from the endpoint.
    #[error("API Error: {status} {reason}")]
    Api { status: u16, reason: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub reasoning: bool,
    pub stream: bool,
}

/// A batched (non-streamed) completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub reasoning_details: Option<Value>,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reasoning_details: None,
        }
    }
}

/// Handle for receiving streaming events from a completion request.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. Dropping the handle closes the
/// channel, which tells the producer to stop reading the response body.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, or `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// Gateway to a hosted chat-completion endpoint
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Request a completion and wait for the whole body.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError>;

    /// Request a completion and receive it incrementally.
    ///
    /// Default implementation calls `complete()` and wraps the result in a
    /// single `Completed` event.
    async fn stream(&self, request: &CompletionRequest) -> Result<StreamHandle, GatewayError> {
        let completion = self.complete(request).await?;
        let (tx, rx) = mpsc::channel(2);
        if let Some(details) = completion.reasoning_details {
            let _ = tx.send(StreamEvent::Reasoning(details)).await;
        }
        let _ = tx.send(StreamEvent::Completed(completion.text)).await;
        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGateway;

    #[async_trait]
    impl CompletionGateway for FixedGateway {
        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, GatewayError> {
            Ok(Completion {
                text: "fixed".to_string(),
                reasoning_details: Some(serde_json::json!({"r": 1})),
            })
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: Model::default(),
            messages: vec![],
            max_tokens: 10,
            reasoning: false,
            stream: true,
        }
    }

    #[test]
    fn api_error_display_matches_status_line() {
        let error = GatewayError::Api {
            status: 429,
            reason: "Too Many Requests".to_string(),
        };
        assert_eq!(error.to_string(), "API Error: 429 Too Many Requests");
    }

    #[tokio::test]
    async fn handle_yields_events_until_producer_is_gone() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("Hel".to_string())).await.unwrap();
        tx.send(StreamEvent::Completed("Hello".to_string())).await.unwrap();
        drop(tx);

        let mut handle = StreamHandle::new(rx);
        assert_eq!(handle.next().await, Some(StreamEvent::Delta("Hel".to_string())));
        assert_eq!(
            handle.next().await,
            Some(StreamEvent::Completed("Hello".to_string()))
        );
        assert_eq!(handle.next().await, None);
    }

    #[tokio::test]
    async fn dropping_handle_closes_channel() {
        let (tx, rx) = mpsc::channel::<StreamEvent>(8);
        drop(StreamHandle::new(rx));
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn default_stream_wraps_batched_completion() {
        let mut handle = FixedGateway.stream(&request()).await.unwrap();
        assert_eq!(
            handle.next().await,
            Some(StreamEvent::Reasoning(serde_json::json!({"r": 1})))
        );
        assert_eq!(
            handle.next().await,
            Some(StreamEvent::Completed("fixed".to_string()))
        );
        assert_eq!(handle.next().await, None);
    }
}
