//! Presentation-level configuration
//!
//! Settings for the interactive chat that the binary derives from the file
//! configuration and command-line flags.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show the "Thinking..." spinner
    pub show_progress: bool,
    /// Path to the readline history file
    pub history_file: Option<PathBuf>,
    /// Keep the newest lines in view while an answer streams
    pub follow_tail: bool,
    /// Show the welcome banner on first run
    pub show_welcome: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            follow_tail: true,
            show_welcome: true,
        }
    }
}
