//! Widget wire protocol: JSON text frames tagged by `type`.

use chrono::{DateTime, Utc};
use medidrop_ai::{ChatSettings, Message, SettingsUpdate, TurnKind};
use serde::{Deserialize, Serialize};

/// Frames the widget sends.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Send { text: String },
    Reset,
    /// Full CSV transcript download.
    Export,
    History,
    Settings(SettingsUpdate),
}

/// Severity of a banner shown next to the conversation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Frames the server sends back.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionReady {
        session_id: String,
        started_at: DateTime<Utc>,
        settings: ChatSettings,
    },
    Reply {
        message: Message,
        kind: TurnKind,
    },
    /// Visible conversation, system entry excluded.
    History {
        started_at: DateTime<Utc>,
        messages: Vec<Message>,
    },
    Export {
        file_name: String,
        csv: String,
    },
    Settings {
        settings: ChatSettings,
    },
    Notice {
        level: NoticeLevel,
        text: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn notice(level: NoticeLevel, text: impl Into<String>) -> Self {
        ServerMessage::Notice {
            level,
            text: text.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
