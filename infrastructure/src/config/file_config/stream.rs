//! Streaming configuration from TOML (`[stream]` and `[typing]` sections)

use serde::{Deserialize, Serialize};

/// Raw streaming configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    /// Read responses as an SSE stream; when off, the batched answer is
    /// replayed with the `[typing]` settings
    pub enabled: bool,
}

impl Default for FileStreamConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[typing]` uses the domain type directly.
pub use balikci_domain::TypingEffect as FileTypingConfig;
