//! Async chat turn for ChatSession.

use tracing::{info, warn};

use crate::prompt::build_transcript;
use crate::retry::{call_with_retry, CallOutcome, Sleeper};
use crate::{ChatError, CompletionClient, CompletionRequest, Role};

use super::manager::ChatSession;
use super::types::{TurnKind, TurnOutcome};

impl ChatSession {
    /// Run one user turn: record the message, call the endpoint with retry,
    /// and append the assistant reply (or the matching failure message).
    pub async fn send(
        &mut self,
        client: &dyn CompletionClient,
        sleeper: &dyn Sleeper,
        user_text: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        // Context is taken before the new message so it is sent exactly once.
        let context = self.conversation.context(self.context_window);
        self.conversation.append(Role::User, text)?;

        let request = CompletionRequest {
            model: self.settings.model.as_str().to_string(),
            prompt: build_transcript(&context, text),
        };
        let policy = self.settings.retry_policy();
        let outcome = call_with_retry(client, sleeper, &policy, &request).await;

        let (kind, reply) = match outcome {
            CallOutcome::Reply(text) => {
                let reply = self.conversation.append(Role::Assistant, text)?.clone();
                (TurnKind::Answered, reply)
            }
            CallOutcome::RateLimited => {
                let dropped = self.conversation.begin_rate_limit_recovery(self.recovery_keep);
                let reply = self
                    .conversation
                    .append(Role::Assistant, self.rate_limit_apology.clone())?
                    .clone();
                warn!(session = %self.id, dropped, "rate limit exhausted, history trimmed");
                (TurnKind::RateLimitRecovered { dropped }, reply)
            }
            CallOutcome::UpstreamError { status, body } => {
                let text = format!("[ERROR] API response error: {status} - {body}");
                let reply = self.conversation.append(Role::Assistant, text)?.clone();
                (TurnKind::UpstreamFailed { status }, reply)
            }
            CallOutcome::Unreachable(reason) => {
                let text = format!("[ERROR] API request failed: {reason}");
                let reply = self.conversation.append(Role::Assistant, text)?.clone();
                (TurnKind::Unreachable, reply)
            }
        };

        let log_warning = self.log_last_turn().await;

        info!(session = %self.id, kind = ?kind, messages = self.conversation.non_system_len(), "turn complete");
        Ok(TurnOutcome {
            reply,
            kind,
            log_warning,
        })
    }

    /// Append the latest user/assistant pair to the CSV log if enabled.
    async fn log_last_turn(&self) -> Option<String> {
        if !self.settings.auto_log {
            return None;
        }
        let log = self.csv_log.as_ref()?;
        let turn = self.conversation.window(2).to_vec();
        match log.append_async(self.id.clone(), turn).await {
            Ok(()) => None,
            Err(e) => {
                warn!(session = %self.id, path = %log.path().display(), error = %e, "csv log write failed");
                Some(format!("CSV save failed: {e}"))
            }
        }
    }
}
