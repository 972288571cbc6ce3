//! ChatSession struct and synchronous session management.

use chrono::{DateTime, Utc};
use medidrop_common::SessionId;
use medidrop_config::MedidropConfig;
use tracing::info;

use crate::export::{transcript_to_string, CsvLog, ExportError};
use crate::history::{Conversation, HistoryState};
use crate::{ChatError, Message};

use super::types::{ChatSettings, SettingsUpdate};

/// One user's conversation plus the settings it runs under.
pub struct ChatSession {
    pub(super) id: SessionId,
    pub(super) conversation: Conversation,
    pub(super) settings: ChatSettings,
    /// Non-system messages sent as context with each request.
    pub(super) context_window: usize,
    /// Non-system messages kept after rate-limit exhaustion.
    pub(super) recovery_keep: usize,
    pub(super) rate_limit_apology: String,
    /// Used only while `settings.auto_log` is on.
    pub(super) csv_log: Option<CsvLog>,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let defaults = MedidropConfig::default();
        Self {
            id: SessionId::new(),
            conversation: Conversation::new(system_prompt),
            settings: ChatSettings::from_config(&defaults),
            context_window: defaults.history.context_window as usize,
            recovery_keep: defaults.history.recovery_keep as usize,
            rate_limit_apology: defaults.persona.rate_limit_apology,
            csv_log: None,
        }
    }

    pub fn from_config(config: &MedidropConfig) -> Self {
        Self::new(config.persona.system_prompt.clone())
            .with_settings(ChatSettings::from_config(config))
            .with_context_window(config.history.context_window as usize)
            .with_recovery_keep(config.history.recovery_keep as usize)
            .with_rate_limit_apology(config.persona.rate_limit_apology.clone())
    }

    pub fn with_settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_context_window(mut self, n: usize) -> Self {
        self.context_window = n;
        self
    }

    pub fn with_recovery_keep(mut self, n: usize) -> Self {
        self.recovery_keep = n;
        self
    }

    pub fn with_rate_limit_apology(mut self, text: impl Into<String>) -> Self {
        self.rate_limit_apology = text.into();
        self
    }

    /// Attach the process-wide log handle; sessions sharing a file must
    /// pass clones of one `CsvLog`.
    pub fn with_csv_log(mut self, log: CsvLog) -> Self {
        self.csv_log = Some(log);
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.conversation.started_at()
    }

    pub fn state(&self) -> HistoryState {
        self.conversation.state()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Messages shown to the user (everything but the system entry).
    pub fn visible_messages(&self) -> &[Message] {
        self.conversation.non_system()
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn apply_settings(&mut self, update: &SettingsUpdate) -> Result<&ChatSettings, ChatError> {
        self.settings.apply(update)?;
        info!(session = %self.id, settings = ?self.settings, "settings updated");
        Ok(&self.settings)
    }

    /// Clear the conversation, keeping the session id and system entry.
    pub fn reset(&mut self) {
        self.conversation.reset();
        info!(session = %self.id, "conversation reset");
    }

    /// Full transcript (system entry included) as CSV text.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        transcript_to_string(&self.id, self.conversation.messages())
    }

    pub fn export_file_name(&self) -> String {
        format!("chatlog_{}.csv", self.id)
    }
}
