//! Presentation layer for balikci
//!
//! This crate contains the CLI definition, Markdown rendering, the live
//! streaming view, console formatting and the interactive chat.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod render;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use output::console::{ConsoleFormatter, EXAMPLE_QUESTIONS};
pub use render::{LiveStreamView, MarkdownRenderer, Viewport};
