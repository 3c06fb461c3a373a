//! Configuration file loading for balikci
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `OPENROUTER_API_KEY` (API key only)
//! 2. `BALIKCI_*` environment variables
//! 3. `--config <path>` specified file
//! 4. Project root: `./balikci.toml` or `./.balikci.toml`
//! 5. XDG config: `$XDG_CONFIG_HOME/balikci/config.toml`
//! 6. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApiConfig, FileChatConfig, FileConfig, FileLoggingConfig,
    FileStorageConfig, FileStreamConfig, FileTypingConfig, expand_home,
};
pub use loader::{API_KEY_ENV, ConfigLoader, ENV_PREFIX};
