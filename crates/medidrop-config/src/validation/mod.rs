//! Full configuration validation.
//!
//! Validates numeric ranges and required strings, collecting every error
//! into a single `ConfigError`.

mod helpers;


use crate::schema::{MedidropConfig, RetryConfig};
use medidrop_common::ConfigError;

use helpers::{validate_non_empty, validate_range, validate_range_f64};

pub const MAX_RETRIES_RANGE: (u32, u32) = (1, 10);
pub const BACKOFF_BASE_RANGE: (f64, f64) = (1.0, 10.0);

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MedidropConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_model(&mut errors, config);
    validate_retry_into(&mut errors, &config.retry);
    validate_history(&mut errors, config);
    validate_persona(&mut errors, config);
    validate_server(&mut errors, config);

    finish(errors)
}

/// Validate only the retry section. Used for runtime settings updates.
pub fn validate_retry(retry: &RetryConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    validate_retry_into(&mut errors, retry);
    finish(errors)
}

fn finish(errors: Vec<String>) -> Result<(), ConfigError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_model(errors: &mut Vec<String>, config: &MedidropConfig) {
    let model = &config.model;
    if !model.api_url_template.contains("{model}") {
        errors.push("model.api_url_template must contain '{model}'".into());
    }
    validate_range_f64(errors, "model.temperature", model.temperature, 0.0, 2.0);
    validate_range(errors, "model.candidate_count", model.candidate_count, 1, 8);
    validate_range(
        errors,
        "model.max_output_tokens",
        model.max_output_tokens,
        1,
        8192,
    );
    validate_range(
        errors,
        "model.request_timeout_secs",
        model.request_timeout_secs,
        1,
        300,
    );
}

fn validate_retry_into(errors: &mut Vec<String>, retry: &RetryConfig) {
    validate_range(
        errors,
        "retry.max_retries",
        retry.max_retries,
        MAX_RETRIES_RANGE.0,
        MAX_RETRIES_RANGE.1,
    );
    validate_range_f64(
        errors,
        "retry.backoff_base_secs",
        retry.backoff_base_secs,
        BACKOFF_BASE_RANGE.0,
        BACKOFF_BASE_RANGE.1,
    );
}

fn validate_history(errors: &mut Vec<String>, config: &MedidropConfig) {
    validate_range(
        errors,
        "history.context_window",
        config.history.context_window,
        1,
        200,
    );
    validate_range(
        errors,
        "history.recovery_keep",
        config.history.recovery_keep,
        0,
        200,
    );
}

fn validate_persona(errors: &mut Vec<String>, config: &MedidropConfig) {
    validate_non_empty(errors, "persona.system_prompt", &config.persona.system_prompt);
    validate_non_empty(
        errors,
        "persona.rate_limit_apology",
        &config.persona.rate_limit_apology,
    );
}

fn validate_server(errors: &mut Vec<String>, config: &MedidropConfig) {
    validate_non_empty(errors, "server.bind", &config.server.bind);
    validate_range(errors, "server.port", config.server.port, 1024, 65535);
    validate_range(
        errors,
        "server.idle_timeout_secs",
        config.server.idle_timeout_secs,
        10,
        86400,
    );
}
