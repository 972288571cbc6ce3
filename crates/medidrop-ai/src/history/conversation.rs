//! Conversation struct and window management.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{ChatError, Message, Role};

use super::types::HistoryState;

/// Ordered message log. `messages[0]` is always the single system entry.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    started_at: DateTime<Utc>,
    state: HistoryState,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::new(Role::System, system_prompt)],
            started_at: medidrop_common::now(),
            state: HistoryState::Empty,
        }
    }

    /// Append a user or assistant message. The system entry is fixed.
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> Result<&Message, ChatError> {
        match role {
            Role::System => return Err(ChatError::SystemEntryFixed),
            Role::User if self.state == HistoryState::Empty => {
                self.state = HistoryState::Active;
            }
            Role::Assistant if self.state == HistoryState::RateLimitedRecovery => {
                self.state = HistoryState::Active;
            }
            _ => {}
        }

        self.messages.push(Message::new(role, text));
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// The most recent `n` non-system messages, oldest first.
    pub fn window(&self, n: usize) -> &[Message] {
        let rest = self.non_system();
        &rest[rest.len().saturating_sub(n)..]
    }

    /// System entry followed by `window(n)`.
    pub fn context(&self, n: usize) -> Vec<Message> {
        let mut msgs = Vec::with_capacity(n.min(self.non_system_len()) + 1);
        msgs.push(self.system().clone());
        msgs.extend_from_slice(self.window(n));
        msgs
    }

    /// Drop every non-system message and restart the clock.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
        self.started_at = medidrop_common::now();
        self.state = HistoryState::Empty;
    }

    /// Keep only the last `keep` non-system messages. Returns how many were dropped.
    ///
    /// The conversation stays in `RateLimitedRecovery` until the next
    /// assistant message is appended.
    pub fn begin_rate_limit_recovery(&mut self, keep: usize) -> usize {
        let dropped = self.non_system_len().saturating_sub(keep);
        self.messages.drain(1..1 + dropped);
        self.state = HistoryState::RateLimitedRecovery;
        debug!(dropped, kept = self.non_system_len(), "trimmed history after rate limiting");
        dropped
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    pub fn non_system(&self) -> &[Message] {
        &self.messages[1..]
    }

    pub fn non_system_len(&self) -> usize {
        self.messages.len() - 1
    }

    pub fn state(&self) -> HistoryState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
