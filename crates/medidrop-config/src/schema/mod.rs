//! Configuration schema types for medidrop.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod csv_log;
mod history;
mod model;
mod persona;
mod retry;
mod server;
mod system;

pub use csv_log::*;
pub use history::*;
pub use model::*;
pub use persona::*;
pub use retry::*;
pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MedidropConfig {
    pub model: ModelConfig,
    pub retry: RetryConfig,
    pub history: HistoryConfig,
    pub csv_log: CsvLogConfig,
    pub persona: PersonaConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_defaults() {
        let config = MedidropConfig::default();
        assert_eq!(config.model.name, ModelName::Gemini20Flash);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.backoff_base_secs, 1.0);
        assert_eq!(config.history.context_window, 20);
        assert_eq!(config.history.recovery_keep, 12);
        assert!(!config.csv_log.auto_log);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: MedidropConfig = toml::from_str(
            r#"
[retry]
max_retries = 3
"#,
        )
        .unwrap();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_base_secs, 1.0);
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn model_name_from_toml() {
        let config: MedidropConfig = toml::from_str(
            r#"
[model]
name = "gemini-1.5-flash"
"#,
        )
        .unwrap();
        assert_eq!(config.model.name, ModelName::Gemini15Flash);
    }

    #[test]
    fn unknown_model_is_rejected() {
        let result: Result<MedidropConfig, _> = toml::from_str(
            r#"
[model]
name = "not-a-model"
"#,
        );
        assert!(result.is_err());
    }
}
