//! OpenRouter chat-completions wire format.
//!
//! Only the fields this client reads or writes are modelled; everything else
//! in the response is ignored by serde.

use balikci_application::CompletionRequest;
use balikci_domain::PromptMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal payload of an OpenRouter stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [PromptMessage],
    pub reasoning: ReasoningOptions,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ReasoningOptions {
    pub enabled: bool,
}

impl<'a> ChatRequest<'a> {
    pub fn from_completion_request(request: &'a CompletionRequest, stream: bool) -> Self {
        Self {
            model: request.model.as_str(),
            messages: &request.messages,
            reasoning: ReasoningOptions {
                enabled: request.reasoning,
            },
            max_tokens: request.max_tokens,
            stream,
        }
    }
}

/// A response body, or one streamed chunk of it.
///
/// Batched responses carry `choices[].message`; streamed chunks carry
/// `choices[].delta` and sometimes a final `message`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub message: Option<ChoiceContent>,
    pub delta: Option<ChoiceContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChoiceContent {
    pub content: Option<String>,
    pub reasoning_details: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: String,
}

impl ChatResponse {
    fn first(&self) -> Option<&Choice> {
        self.choices.first()
    }

    /// Text of a streamed chunk.
    pub fn delta_content(&self) -> Option<&str> {
        self.first()?
            .delta
            .as_ref()?
            .content
            .as_deref()
            .filter(|s| !s.is_empty())
    }

    /// Text of a batched response.
    pub fn message_content(&self) -> Option<&str> {
        self.first()?.message.as_ref()?.content.as_deref()
    }

    /// Reasoning details from the delta, falling back to the message.
    pub fn reasoning_details(&self) -> Option<&Value> {
        fn from(c: &Option<ChoiceContent>) -> Option<&Value> {
            c.as_ref()
                .and_then(|c| c.reasoning_details.as_ref())
                .filter(|v| !v.is_null())
        }

        let choice = self.first()?;
        from(&choice.delta).or_else(|| from(&choice.message))
    }

    /// Error reported inside the body, formatted for display.
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        Some(match &error.code {
            Some(code) if !code.is_null() => format!("{} {}", code, error.message),
            _ => error.message.clone(),
        })
    }
}
