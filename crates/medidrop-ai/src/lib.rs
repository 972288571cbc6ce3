//! Conversation engine for medidrop.
//!
//! Provides the generate-API client and everything layered on it:
//! - Rate-limit retry with exponential backoff
//! - Sliding-window conversation history
//! - Chat sessions that classify each turn's outcome
//! - CSV transcript export and append logging

pub mod export;
pub mod gemini;
pub mod history;
pub mod prompt;
pub mod reply;
pub mod retry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use export::{CsvLog, ExportError, TranscriptRow};
pub use gemini::{GeminiClient, GeminiConfig};
pub use history::{Conversation, HistoryState};
pub use retry::{call_with_retry, CallOutcome, RetryPolicy, Sleeper, TokioSleeper};
pub use session::{ChatSession, ChatSettings, SettingsUpdate, TurnKind, TurnOutcome};

/// A completion endpoint. Returns the decoded JSON body of a successful
/// response; rate limiting and other HTTP failures come back as `AiError`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<serde_json::Value, AiError>;
}

/// One outbound generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    /// Role-tagged transcript, see [`prompt::build_transcript`].
    pub prompt: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: medidrop_common::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Rate limited")]
    RateLimited,
    #[error("Upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message text is empty")]
    EmptyMessage,
    #[error("the conversation already has its system entry")]
    SystemEntryFixed,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }

    #[test]
    fn message_new_stamps_current_time() {
        let before = Utc::now();
        let msg = Message::new(Role::User, "hello");
        assert!(msg.timestamp >= before);
        assert_eq!(msg.text, "hello");
    }

    #[test]
    fn ai_error_display() {
        let err = AiError::Upstream {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "Upstream error: HTTP 503: unavailable");
        assert_eq!(AiError::RateLimited.to_string(), "Rate limited");
    }
}
