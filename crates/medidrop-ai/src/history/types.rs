use serde::Serialize;

/// Lifecycle of a conversation between resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryState {
    /// Only the system entry; no user message yet.
    Empty,
    Active,
    /// History was trimmed after rate-limit exhaustion; waiting for the apology.
    RateLimitedRecovery,
}
