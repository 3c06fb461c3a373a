//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for balikci
#[derive(Parser, Debug)]
#[command(name = "balikci")]
#[command(author, version, about = "Programming tutor chat for the terminal")]
#[command(long_about = r#"
Balıkçı is a programming tutor. It explains concepts and points at the
mistakes in your code, but it never writes the code for you.

Without a QUESTION it starts an interactive chat. The conversation is kept
between runs in the data directory.

An OpenRouter API key is required, read from OPENROUTER_API_KEY or [api]
api_key in a config file.

Configuration files are loaded from (in priority order):
1. --config <path>      Explicit config file
2. ./balikci.toml       Project-level config
3. ~/.config/balikci/config.toml   Global config

Environment variables BALIKCI_<SECTION>__<KEY> override files.

Example:
  balikci
  balikci "What is the difference between a process and a thread?"
  balikci -m anthropic/claude-sonnet-4.5 --no-stream
"#)]
pub struct Cli {
    /// Ask one question, print the answer and exit
    pub question: Option<String>,

    /// Model identifier (e.g. x-ai/grok-4.1-fast:free)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Request the whole answer at once and replay it with the typing effect
    #[arg(long)]
    pub no_stream: bool,

    /// Show non-streamed answers at once instead of typing them out
    #[arg(long)]
    pub no_typing: bool,

    /// Maximum tokens per answer
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Directory for the saved conversation and input history
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Keep the conversation in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the progress spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Append a JSONL transcript of conversation events to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_one_shot_with_flags() {
        let cli = Cli::parse_from([
            "balikci",
            "-m",
            "openai/gpt-4.1-mini",
            "--no-stream",
            "-vv",
            "What is a pointer?",
        ]);
        assert_eq!(cli.question.as_deref(), Some("What is a pointer?"));
        assert_eq!(cli.model.as_deref(), Some("openai/gpt-4.1-mini"));
        assert!(cli.no_stream);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.no_persist);
    }

    #[test]
    fn test_parse_chat_mode_defaults() {
        let cli = Cli::parse_from(["balikci"]);
        assert!(cli.question.is_none());
        assert!(cli.max_tokens.is_none());
        assert!(!cli.show_config);
    }
}
