//! medidrop: WebSocket chat service answering medicine-disposal questions.
//!
//! Each connection owns one chat session. Sessions live only as long as
//! their socket; nothing about them survives a disconnect except the
//! optional CSV auto-log.

mod cli;
mod connection;
mod protocol;
mod registry;
mod state;

#[cfg(test)]
mod test_support;

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use medidrop_ai::{GeminiClient, GeminiConfig, TokioSleeper};
use medidrop_common::{ConfigError, MedidropError};
use medidrop_config::{secrets, MedidropConfig};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

use crate::cli::Args;
use crate::connection::handle_connection;
use crate::state::ServerState;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "medidrop exited");
            eprintln!("medidrop: {e}");
            ExitCode::FAILURE
        }
    }
}

const DEFAULT_LOG_DIRECTIVE: &str = "medidrop=info";

async fn run(args: Args) -> Result<(), MedidropError> {
    // Logging comes up before config so loader warnings are visible.
    let (filter, filter_handle) = reload::Layer::new(startup_filter(args.log_level.as_deref()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let mut config = load_config(&args);
    let rust_log_set = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    if let Some(directive) = configured_directive(&args, rust_log_set, &config) {
        if let Err(e) = filter_handle.reload(EnvFilter::new(directive)) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }
    apply_overrides(&mut config, &args);

    let secrets_path = match &args.secrets {
        Some(path) => path.clone(),
        None => secrets::default_secrets_path()?,
    };
    let key = match secrets::resolve_api_key(&secrets_path)? {
        Some(key) => key,
        None if std::io::stdin().is_terminal() => {
            secrets::prompt_api_key(std::io::stdin().lock(), std::io::stderr())?
                .ok_or_else(|| ConfigError::MissingSecret(secrets::API_KEY_ENV.into()))?
        }
        None => return Err(ConfigError::MissingSecret(secrets::API_KEY_ENV.into()).into()),
    };
    tracing::info!(source = ?key.source(), "API key resolved");

    let client = GeminiClient::new(GeminiConfig::from_api_key(&key, &config.model))
        .map_err(|e| MedidropError::Ai(e.to_string()))?;

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        model = %config.model.name,
        auto_log = config.csv_log.auto_log,
        "medidrop listening"
    );

    let state = Arc::new(ServerState::new(
        config,
        Arc::new(client),
        Arc::new(TokioSleeper),
    ));

    let stats_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let count = stats_state.registry.count().await;
            tracing::debug!(sessions = count, "Stats tick");
        }
    });

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = state.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, peer, state).await,
                        Err(e) => {
                            tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// `--log-level` wins, then `RUST_LOG`, then the built-in default.
fn startup_filter(log_level: Option<&str>) -> EnvFilter {
    if let Some(level) = log_level {
        match EnvFilter::try_new(level) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("medidrop: ignoring --log-level {level:?}: {e}"),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// The `[logging] level` directive, unless the operator already chose a filter.
fn configured_directive(
    args: &Args,
    rust_log_set: bool,
    config: &MedidropConfig,
) -> Option<&'static str> {
    if args.log_level.is_some() || rust_log_set {
        return None;
    }
    Some(config.logging.level.directive())
}

fn load_config(args: &Args) -> MedidropConfig {
    let loaded = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using config override");
            medidrop_config::load_config_from(path)
        }
        None => medidrop_config::load_config(),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        MedidropConfig::default()
    })
}

fn apply_overrides(config: &mut MedidropConfig, args: &Args) {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = u32::from(port);
    }
    if let Some(model) = args.model {
        config.model.name = model;
    }
    if args.auto_log {
        config.csv_log.auto_log = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use medidrop_config::schema::LogLevel;
    use medidrop_config::ModelName;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn invalid_config_fallback_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_retries = 0\n").unwrap();
        let args = Args::try_parse_from(["medidrop", "--config", path.to_str().unwrap()]).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || load_config(&args));

        assert_eq!(config.retry.max_retries, 5);
        let text = logs.text();
        assert!(text.contains("config validation warning"), "{text}");
        assert!(text.contains("falling back to default config"), "{text}");
    }

    #[test]
    fn missing_config_file_is_logged_and_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let args = Args::try_parse_from(["medidrop", "--config", path.to_str().unwrap()]).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || load_config(&args));

        assert_eq!(config.server.port, 8501);
        assert!(logs.text().contains("Failed to load config, using defaults"));
    }

    #[test]
    fn configured_level_applies_without_operator_filter() {
        let args = Args::try_parse_from(["medidrop"]).unwrap();
        let mut config = MedidropConfig::default();
        config.logging.level = LogLevel::Debug;

        assert_eq!(
            configured_directive(&args, false, &config),
            Some("medidrop=debug")
        );
        assert_eq!(configured_directive(&args, true, &config), None);
    }

    #[test]
    fn cli_log_level_beats_configured_level() {
        let args = Args::try_parse_from(["medidrop", "--log-level", "medidrop=trace"]).unwrap();
        let config = MedidropConfig::default();

        assert_eq!(configured_directive(&args, false, &config), None);
        assert_eq!(
            startup_filter(args.log_level.as_deref()).to_string(),
            "medidrop=trace"
        );
    }

    #[test]
    fn overrides_replace_config_values() {
        let args = Args::try_parse_from([
            "medidrop",
            "--bind",
            "0.0.0.0",
            "--port",
            "9100",
            "--model",
            "gemini-1.5-pro",
        ])
        .unwrap();
        let mut config = MedidropConfig::default();
        config.csv_log.auto_log = false;

        apply_overrides(&mut config, &args);

        assert_eq!(config.server.listen_addr(), "0.0.0.0:9100");
        assert_eq!(config.model.name, ModelName::Gemini15Pro);
        assert!(!config.csv_log.auto_log);
    }

    #[test]
    fn no_overrides_keep_config() {
        let args = Args::try_parse_from(["medidrop"]).unwrap();
        let mut config = MedidropConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.server.listen_addr(), "127.0.0.1:8501");
        assert_eq!(config.model.name, ModelName::Gemini20Flash);
    }
}
