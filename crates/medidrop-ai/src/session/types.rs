//! Session settings and turn outcome types.

use medidrop_config::schema::{ModelName, RetryConfig};
use medidrop_config::{validation, MedidropConfig};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::{ChatError, Message};

/// Per-session knobs the user can change while chatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub model: ModelName,
    pub auto_log: bool,
    pub max_retries: u32,
    pub backoff_base_secs: f64,
}

impl ChatSettings {
    pub fn from_config(config: &MedidropConfig) -> Self {
        Self {
            model: config.model.name,
            auto_log: config.csv_log.auto_log,
            max_retries: config.retry.max_retries,
            backoff_base_secs: config.retry.backoff_base_secs,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.backoff_base_secs)
    }

    /// Apply `update` if the result is valid; otherwise leave `self` untouched.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Result<(), ChatError> {
        let mut next = self.clone();
        if let Some(model) = update.model {
            next.model = model;
        }
        if let Some(auto_log) = update.auto_log {
            next.auto_log = auto_log;
        }
        if let Some(max_retries) = update.max_retries {
            next.max_retries = max_retries;
        }
        if let Some(backoff) = update.backoff_base_secs {
            next.backoff_base_secs = backoff;
        }

        validation::validate_retry(&RetryConfig {
            max_retries: next.max_retries,
            backoff_base_secs: next.backoff_base_secs,
        })
        .map_err(|e| ChatError::InvalidSettings(e.to_string()))?;

        *self = next;
        Ok(())
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&MedidropConfig::default())
    }
}

/// Partial settings change; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub model: Option<ModelName>,
    pub auto_log: Option<bool>,
    pub max_retries: Option<u32>,
    pub backoff_base_secs: Option<f64>,
}

/// How a user turn ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnKind {
    Answered,
    /// Retries ran out; older history was dropped and an apology appended.
    RateLimitRecovered { dropped: usize },
    UpstreamFailed { status: u16 },
    Unreachable,
}

impl TurnKind {
    pub fn is_failure(&self) -> bool {
        !matches!(self, TurnKind::Answered)
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The assistant message appended for this turn.
    pub reply: Message,
    pub kind: TurnKind,
    /// Set when auto-logging was on and the CSV write failed.
    pub log_warning: Option<String>,
}
