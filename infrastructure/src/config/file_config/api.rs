//! API configuration from TOML (`[api]` section)

use balikci_domain::Model;
use serde::{Deserialize, Serialize};

/// Raw API configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// API root; `/chat/completions` is appended
    pub base_url: String,
    /// Bearer token (prefer the `OPENROUTER_API_KEY` environment variable)
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    pub max_tokens: u32,
    /// Request reasoning output from the model
    pub reasoning: bool,
    /// Connect timeout, and total timeout for non-streamed requests
    pub timeout_seconds: u64,
    /// `HTTP-Referer` header for app attribution
    pub site_url: Option<String>,
    /// `X-Title` header for app attribution
    pub site_name: Option<String>,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            model: Model::default().to_string(),
            max_tokens: 1200,
            reasoning: true,
            timeout_seconds: 120,
            site_url: None,
            site_name: Some("Balikci".to_string()),
        }
    }
}

impl FileApiConfig {
    pub fn parse_model(&self) -> Model {
        let Ok(model) = self.model.trim().parse::<Model>();
        model
    }
}
