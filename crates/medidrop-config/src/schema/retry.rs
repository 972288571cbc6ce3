//! Rate-limit retry configuration types.

use serde::{Deserialize, Serialize};

/// Backoff behavior for HTTP 429 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts before giving up (valid range: 1-10).
    pub max_retries: u32,
    /// Base delay in seconds, doubled after every attempt (valid range: 1.0-10.0).
    pub backoff_base_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base_secs: 1.0,
        }
    }
}
