//! API key resolution.
//!
//! The key is read from `secrets.toml` in the config directory, then from the
//! `GEMINI_API_KEY` environment variable. When neither is set the caller may
//! prompt for a key, which lives only in memory for the process lifetime.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use medidrop_common::ConfigError;
use serde::Deserialize;
use tracing::{debug, info};

use crate::toml_loader::config_dir;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const SECRETS_FILE_NAME: &str = "secrets.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretsFile {
    gemini: GeminiSecrets,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeminiSecrets {
    api_key: Option<String>,
}

/// Where an API key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    SecretsFile(PathBuf),
    Environment,
    /// Typed in by the operator; never written anywhere.
    Prompt,
}

/// An API key together with its origin. `Debug` never prints the key.
#[derive(Clone)]
pub struct ApiKey {
    value: String,
    source: ApiKeySource,
}

impl ApiKey {
    pub fn new(value: impl Into<String>, source: ApiKeySource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> &ApiKeySource {
        &self.source
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// Default location of `secrets.toml`.
pub fn default_secrets_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(SECRETS_FILE_NAME))
}

/// Read `[gemini] api_key` from a secrets file. A missing file is not an error.
pub fn load_secrets_file(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;
    let secrets: SecretsFile = toml::from_str(&content).map_err(|e| {
        ConfigError::ParseError(format!("failed to parse {}: {e}", path.display()))
    })?;
    Ok(non_blank(secrets.gemini.api_key))
}

/// Resolve the key from the secrets file, then the process environment.
pub fn resolve_api_key(secrets_path: &Path) -> Result<Option<ApiKey>, ConfigError> {
    resolve_api_key_with(secrets_path, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with<F>(secrets_path: &Path, env: F) -> Result<Option<ApiKey>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = load_secrets_file(secrets_path)? {
        info!("using API key from {}", secrets_path.display());
        return Ok(Some(ApiKey::new(
            key,
            ApiKeySource::SecretsFile(secrets_path.to_path_buf()),
        )));
    }

    if let Some(key) = non_blank(env(API_KEY_ENV)) {
        info!("using API key from {API_KEY_ENV}");
        return Ok(Some(ApiKey::new(key, ApiKeySource::Environment)));
    }

    debug!("no API key in {} or environment", secrets_path.display());
    Ok(None)
}

/// Ask the operator for a session-only key. Returns `None` on empty input.
pub fn prompt_api_key<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> Result<Option<ApiKey>, ConfigError> {
    let io_err = |e: std::io::Error| ConfigError::MissingSecret(format!("prompt failed: {e}"));

    writeln!(
        output,
        "{API_KEY_ENV} is not configured. A key entered here is used for this run only \
         (storing it in {SECRETS_FILE_NAME} is recommended)."
    )
    .map_err(io_err)?;
    write!(output, "Temporary API key: ").map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(io_err)?;

    Ok(non_blank(Some(line)).map(|key| ApiKey::new(key, ApiKeySource::Prompt)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn secrets_file_wins_over_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE_NAME);
        std::fs::write(&path, "[gemini]\napi_key = \"from-file\"\n").unwrap();

        let key = resolve_api_key_with(&path, |_| Some("from-env".into()))
            .unwrap()
            .unwrap();
        assert_eq!(key.expose(), "from-file");
        assert_eq!(key.source(), &ApiKeySource::SecretsFile(path));
    }

    #[test]
    fn environment_used_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE_NAME);

        let key = resolve_api_key_with(&path, |name| {
            (name == API_KEY_ENV).then(|| "from-env".to_string())
        })
        .unwrap()
        .unwrap();
        assert_eq!(key.expose(), "from-env");
        assert_eq!(key.source(), &ApiKeySource::Environment);
    }

    #[test]
    fn blank_values_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE_NAME);
        std::fs::write(&path, "[gemini]\napi_key = \"  \"\n").unwrap();

        let key = resolve_api_key_with(&path, |_| Some(String::new())).unwrap();
        assert!(key.is_none());
    }

    #[test]
    fn malformed_secrets_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE_NAME);
        std::fs::write(&path, "gemini = [").unwrap();

        let err = resolve_api_key_with(&path, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn prompt_reads_trimmed_key() {
        let mut out = Vec::new();
        let key = prompt_api_key(Cursor::new("  typed-key \n"), &mut out)
            .unwrap()
            .unwrap();
        assert_eq!(key.expose(), "typed-key");
        assert_eq!(key.source(), &ApiKeySource::Prompt);
        assert!(String::from_utf8(out).unwrap().contains(API_KEY_ENV));
    }

    #[test]
    fn prompt_with_empty_input_returns_none() {
        let key = prompt_api_key(Cursor::new("\n"), Vec::new()).unwrap();
        assert!(key.is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let key = ApiKey::new("super-secret", ApiKeySource::Environment);
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
