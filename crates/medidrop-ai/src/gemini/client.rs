//! Generate API client struct and request building.

use crate::{AiError, CompletionRequest};

use super::config::GeminiConfig;

/// Generate API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub(crate) fn api_url(&self, model: &str) -> String {
        self.config.api_url_template.replace("{model}", model)
    }

    /// Build the JSON request body for the generate endpoint.
    pub(crate) fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "prompt": { "text": request.prompt },
            "temperature": self.config.temperature,
            "candidate_count": self.config.candidate_count,
            "max_output_tokens": self.config.max_output_tokens,
        })
    }
}
