//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the runtime parameter
//! types ([`ChatParams`], [`OpenRouterConfig`]) by the binary.

mod api;
mod chat;
mod storage;
mod stream;

pub use api::FileApiConfig;
pub use chat::FileChatConfig;
pub use storage::{FileLoggingConfig, FileStorageConfig, expand_home};
pub use stream::{FileStreamConfig, FileTypingConfig};

use crate::openrouter::OpenRouterConfig;
use balikci_application::ChatParams;
use balikci_domain::TutorPrompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("api.model cannot be empty")]
    EmptyModelName,

    #[error("api.max_tokens cannot be 0")]
    ZeroMaxTokens,

    #[error("api.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("typing.min_delay_ms ({min}) is greater than typing.max_delay_ms ({max})")]
    InvertedTypingDelay { min: u64, max: u64 },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Endpoint, credentials and request options
    pub api: FileApiConfig,
    /// Streaming on/off
    pub stream: FileStreamConfig,
    /// Typing-effect replay for non-streamed answers
    pub typing: FileTypingConfig,
    /// Chat behaviour
    pub chat: FileChatConfig,
    /// Where history is kept
    pub storage: FileStorageConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.api.model.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyModelName);
        }
        if self.api.max_tokens == 0 {
            errors.push(ConfigValidationError::ZeroMaxTokens);
        }
        if self.api.timeout_seconds == 0 {
            errors.push(ConfigValidationError::InvalidTimeout);
        }
        if self.typing.min_delay_ms > self.typing.max_delay_ms {
            errors.push(ConfigValidationError::InvertedTypingDelay {
                min: self.typing.min_delay_ms,
                max: self.typing.max_delay_ms,
            });
        }

        errors
    }

    /// Per-turn parameters for the chat service.
    pub fn chat_params(&self) -> ChatParams {
        let system_prompt = self
            .chat
            .system_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| TutorPrompt::system().to_string());

        ChatParams::default()
            .with_model(self.api.parse_model())
            .with_system_prompt(system_prompt)
            .with_max_tokens(self.api.max_tokens)
            .with_reasoning(self.api.reasoning)
            .with_streaming(self.stream.enabled)
            .with_typing(self.typing.clone())
            .with_error_display_delay(Duration::from_millis(self.chat.error_display_ms))
    }

    /// Connection settings for the OpenRouter gateway.
    pub fn openrouter_config(&self) -> OpenRouterConfig {
        OpenRouterConfig {
            base_url: self.api.base_url.clone(),
            api_key: self.api.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(self.api.timeout_seconds),
            site_url: self.api.site_url.clone(),
            site_name: self.api.site_name.clone(),
        }
    }

    /// Copy with the API key masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.api.api_key.is_some() {
            config.api.api_key = Some("<redacted>".to_string());
        }
        config
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
