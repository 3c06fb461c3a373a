//! Model value object identifying the hosted LLM

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hosted model a conversation is sent to (Value Object)
///
/// Identifiers follow the OpenRouter `vendor/model[:variant]` form. Anything
/// not listed here is carried as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Grok41FastFree,
    Grok41Fast,
    ClaudeSonnet45,
    Gpt41Mini,
    Gemini25Flash,
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Grok41FastFree => "x-ai/grok-4.1-fast:free",
            Model::Grok41Fast => "x-ai/grok-4.1-fast",
            Model::ClaudeSonnet45 => "anthropic/claude-sonnet-4.5",
            Model::Gpt41Mini => "openai/gpt-4.1-mini",
            Model::Gemini25Flash => "google/gemini-2.5-flash",
            Model::Custom(s) => s,
        }
    }

    /// Whether the model accepts the `reasoning` request option.
    pub fn supports_reasoning(&self) -> bool {
        matches!(
            self,
            Model::Grok41FastFree | Model::Grok41Fast | Model::ClaudeSonnet45 | Model::Gemini25Flash
        )
    }

    /// Models offered in `/model` listings.
    pub fn known_models() -> Vec<Model> {
        vec![
            Model::Grok41FastFree,
            Model::Grok41Fast,
            Model::ClaudeSonnet45,
            Model::Gpt41Mini,
            Model::Gemini25Flash,
        ]
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Grok41FastFree
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "x-ai/grok-4.1-fast:free" => Model::Grok41FastFree,
            "x-ai/grok-4.1-fast" => Model::Grok41Fast,
            "anthropic/claude-sonnet-4.5" => Model::ClaudeSonnet45,
            "openai/gpt-4.1-mini" => Model::Gpt41Mini,
            "google/gemini-2.5-flash" => Model::Gemini25Flash,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}
