use std::path::PathBuf;

use clap::Parser;
use medidrop_config::ModelName;

/// medidrop: customer support chat service for medicine disposal.
#[derive(Parser, Debug)]
#[command(name = "medidrop", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Secrets file path override (holds `[gemini] api_key`).
    #[arg(long)]
    pub secrets: Option<PathBuf>,

    /// Address to bind, overrides `server.bind`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on, overrides `server.port`.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Default model for new sessions, overrides `model.name`.
    #[arg(long)]
    pub model: Option<ModelName>,

    /// Turn on CSV auto-logging for new sessions.
    #[arg(long)]
    pub auto_log: bool,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
