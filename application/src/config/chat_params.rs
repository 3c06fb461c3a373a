//! Chat parameters: how each turn is requested and paced.
//!
//! [`ChatParams`] groups the static parameters that control a turn in
//! [`ChatService`](crate::use_cases::chat_service::ChatService). These are
//! application-layer concerns; the infrastructure config is translated into
//! them by the binary.

use balikci_domain::{Model, TutorPrompt, TypingEffect};
use std::time::Duration;

/// Per-turn parameters.
#[derive(Debug, Clone)]
pub struct ChatParams {
    /// Model identifier sent with every request.
    pub model: Model,
    /// System prompt placed in front of the history.
    pub system_prompt: String,
    /// `max_tokens` request field.
    pub max_tokens: u32,
    /// Ask the model for reasoning output (`reasoning.enabled`).
    pub reasoning: bool,
    /// Read the response as an SSE stream instead of one JSON body.
    pub streaming: bool,
    /// Replay settings used when the response is not streamed.
    pub typing: TypingEffect,
    /// How long an error text stays in the live view before it is
    /// committed to the history.
    pub error_display_delay: Duration,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: Model::default(),
            system_prompt: TutorPrompt::system().to_string(),
            max_tokens: 1200,
            reasoning: true,
            streaming: true,
            typing: TypingEffect::default(),
            error_display_delay: Duration::from_secs(1),
        }
    }
}

impl ChatParams {
    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_reasoning(mut self, enabled: bool) -> Self {
        self.reasoning = enabled;
        self
    }

    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming = enabled;
        self
    }

    pub fn with_typing(mut self, typing: TypingEffect) -> Self {
        self.typing = typing;
        self
    }

    pub fn with_error_display_delay(mut self, delay: Duration) -> Self {
        self.error_display_delay = delay;
        self
    }
}
