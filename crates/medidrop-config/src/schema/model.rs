//! Generation model configuration types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Models the chat widget may be pointed at.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ModelName {
    #[default]
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,
}

impl ModelName {
    pub const ALL: [ModelName; 3] = [
        ModelName::Gemini20Flash,
        ModelName::Gemini15Flash,
        ModelName::Gemini15Pro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Gemini20Flash => "gemini-2.0-flash",
            ModelName::Gemini15Flash => "gemini-1.5-flash",
            ModelName::Gemini15Pro => "gemini-1.5-pro",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unsupported model '{s}'"))
    }
}

/// Remote generation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: ModelName,
    /// Endpoint URL; `{model}` is replaced with the model name.
    pub api_url_template: String,
    pub temperature: f64,
    pub candidate_count: u32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: ModelName::default(),
            api_url_template: "https://generative.googleapis.com/v1beta2/models/{model}:generate"
                .into(),
            temperature: 0.2,
            candidate_count: 1,
            max_output_tokens: 1024,
            request_timeout_secs: 30,
        }
    }
}
