//! medidrop configuration system.
//!
//! Provides TOML-based configuration with validation and API key
//! resolution. All config sections use sensible defaults so partial
//! configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use medidrop_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("listening on {}", config.server.listen_addr());
//! ```

pub mod schema;
pub mod secrets;
pub mod toml_loader;
pub mod validation;

pub use schema::{MedidropConfig, ModelName};
pub use secrets::{ApiKey, ApiKeySource};

use medidrop_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path, creating it if missing.
pub fn load_config() -> Result<MedidropConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path (e.g. `--config`).
pub fn load_config_from(path: &Path) -> Result<MedidropConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}
