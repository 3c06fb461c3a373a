//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_FILES: [&str; 2] = ["balikci.toml", ".balikci.toml"];

/// Prefix for configuration environment variables (`BALIKCI_API__MODEL`).
pub const ENV_PREFIX: &str = "BALIKCI_";

/// Conventional OpenRouter key variable, mapped to `api.api_key`.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `OPENROUTER_API_KEY` (for `api.api_key` only)
    /// 2. `BALIKCI_*` environment variables (`__` separates sections)
    /// 3. Explicit config path (if provided)
    /// 4. Project root: `./balikci.toml` or `./.balikci.toml`
    /// 5. XDG config: `$XDG_CONFIG_HOME/balikci/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, true).extract().map_err(Box::new)
    }

    /// Defaults plus environment, skipping every config file (for `--no-config`)
    pub fn load_without_files() -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(None, false).extract().map_err(Box::new)
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(config_path: Option<&Path>, with_files: bool) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if with_files {
            if let Some(global_path) = Self::global_config_path()
                && global_path.exists()
            {
                figment = figment.merge(Toml::file(&global_path));
            }

            if let Some(path) = Self::project_config_path() {
                figment = figment.merge(Toml::file(path));
            }

            if let Some(path) = config_path {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "api.api_key".into()))
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/balikci/config.toml` if set,
    /// otherwise falls back to `~/.config/balikci/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("balikci").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for `--show-config`)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        if std::env::var_os(API_KEY_ENV).is_some() {
            println!("  [FOUND] Env:     {}", API_KEY_ENV);
        } else {
            println!("  [     ] Env:     {}", API_KEY_ENV);
        }
        println!("  [     ] Env:     {}* variables", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./balikci.toml or ./.balikci.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
