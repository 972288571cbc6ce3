//! Conversation window configuration types.

use serde::{Deserialize, Serialize};

/// Bounds on the context sent upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Most recent non-system messages sent as context.
    pub context_window: u32,
    /// Non-system messages kept after rate-limit exhaustion.
    pub recovery_keep: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            context_window: 20,
            recovery_keep: 12,
        }
    }
}
