//! Chat configuration from TOML (`[chat]` section)

use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Replaces the built-in tutor prompt
    pub system_prompt: Option<String>,
    /// How long an error stays on screen before it is committed
    pub error_display_ms: u64,
    /// Keep the newest lines of a long answer in view while it streams
    pub follow_tail: bool,
    /// Show the welcome banner on first run
    pub show_welcome: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            error_display_ms: 1000,
            follow_tail: true,
            show_welcome: true,
        }
    }
}
