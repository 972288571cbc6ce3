//! Transcript logging configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvLogConfig {
    /// Append each completed turn to the CSV log.
    pub auto_log: bool,
    /// Log file location. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl CsvLogConfig {
    /// Resolve the log path, falling back to `<data_dir>/medidrop/chatbot_logs.csv`.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(ref path) = self.path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("medidrop")
            .join("chatbot_logs.csv")
    }
}
