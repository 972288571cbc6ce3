//! CompletionClient trait implementation for GeminiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::{AiError, CompletionClient, CompletionRequest};

use super::client::GeminiClient;

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<serde_json::Value, AiError> {
        let body = self.build_request_body(request);
        let url = self.api_url(&request.model);

        debug!(model = %request.model, prompt_len = request.prompt.len(), "generate API request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(status = status.as_u16(), error = %e, "failed to read error body");
                    String::new()
                }
            };
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body: error_body(text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))
    }
}

/// Compact JSON if the error body parses, otherwise the raw text.
fn error_body(text: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => json.to_string(),
        Err(_) => text,
    }
}
