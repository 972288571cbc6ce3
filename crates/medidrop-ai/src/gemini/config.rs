//! Generate API client configuration.

use std::time::Duration;

use medidrop_config::schema::ModelConfig;
use medidrop_config::ApiKey;

/// Generate API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Endpoint URL with a `{model}` placeholder.
    pub api_url_template: String,
    pub temperature: f64,
    pub candidate_count: u32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url_template", &self.api_url_template)
            .field("temperature", &self.temperature)
            .field("candidate_count", &self.candidate_count)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_model_config(api_key, &ModelConfig::default())
    }

    pub fn from_model_config(api_key: impl Into<String>, model: &ModelConfig) -> Self {
        Self {
            api_key: api_key.into(),
            api_url_template: model.api_url_template.clone(),
            temperature: model.temperature,
            candidate_count: model.candidate_count,
            max_output_tokens: model.max_output_tokens,
            timeout: Duration::from_secs(u64::from(model.request_timeout_secs)),
        }
    }

    pub fn from_api_key(key: &ApiKey, model: &ModelConfig) -> Self {
        Self::from_model_config(key.expose(), model)
    }

    pub fn with_api_url_template(mut self, template: impl Into<String>) -> Self {
        self.api_url_template = template.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_model_config() {
        let config = GeminiConfig::new("k");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.candidate_count, 1);
        assert_eq!(config.max_output_tokens, 1024);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_url_template.contains("{model}"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GeminiConfig::new("very-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
    }
}
