//! CSV transcripts.
//!
//! Columns are `session_id,role,text,time`, UTF-8 with a byte-order mark so
//! spreadsheet tools pick the right encoding.

mod csv_log;
mod transcript;

pub use csv_log::CsvLog;
pub use transcript::{read_transcript, transcript_to_string, write_transcript, TranscriptRow};

pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub(crate) const HEADER: [&str; 4] = ["session_id", "role", "text", "time"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("transcript is not valid UTF-8")]
    InvalidUtf8,
    #[error("csv log task failed: {0}")]
    Task(String),
}
