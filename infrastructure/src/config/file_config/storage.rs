//! Storage and logging configuration from TOML (`[storage]`, `[logging]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory for `store.json` and the readline history.
    /// Defaults to `$XDG_DATA_HOME/balikci`.
    pub data_dir: Option<String>,
    /// Keep history between runs
    pub persist: bool,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            persist: true,
        }
    }
}

impl FileStorageConfig {
    /// Resolved data directory.
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => expand_home(dir),
            None => dirs::data_dir()
                .map(|d| d.join("balikci"))
                .unwrap_or_else(|| PathBuf::from(".balikci")),
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write tracing output to this file instead of stderr
    pub file: Option<String>,
    /// JSONL transcript of conversation events
    pub conversation_log: Option<String>,
}

impl FileLoggingConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.as_deref().map(expand_home)
    }

    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.conversation_log.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
