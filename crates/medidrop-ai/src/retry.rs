//! Rate-limit retry with exponential backoff.
//!
//! A 429 response sleeps `base * 2^(attempt-1)` seconds and resends, until
//! `max_attempts` consecutive 429s have been seen. Every other failure is
//! returned immediately. The loop never errors; callers match on
//! [`CallOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::reply::extract_reply_text;
use crate::{AiError, CompletionClient, CompletionRequest};

/// Result of one user turn against the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Reply(String),
    /// Every attempt was answered with HTTP 429.
    RateLimited,
    /// Non-retryable HTTP failure.
    UpstreamError { status: u16, body: String },
    /// The request never produced a usable HTTP response.
    Unreachable(String),
}

/// Backoff sleeping, injectable so tests can record delays instead of waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base_secs: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base_secs: f64) -> Self {
        Self {
            max_attempts,
            backoff_base_secs,
        }
    }

    /// Delay after the `attempt`-th (1-based) rate-limited response.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.backoff_base_secs * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or_default()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, 1.0)
    }
}

/// Send `request`, absorbing rate limits per `policy`.
pub async fn call_with_retry(
    client: &dyn CompletionClient,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    request: &CompletionRequest,
) -> CallOutcome {
    let mut attempt = 0;
    while attempt < policy.max_attempts {
        attempt += 1;
        debug!(attempt, model = %request.model, "sending completion request");

        match client.complete(request).await {
            Ok(json) => return CallOutcome::Reply(extract_reply_text(&json)),
            Err(AiError::RateLimited) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    "rate limited, backing off"
                );
                sleeper.sleep(delay).await;
            }
            Err(AiError::Upstream { status, body }) => {
                warn!(status, "upstream returned an error");
                return CallOutcome::UpstreamError { status, body };
            }
            Err(e) => {
                warn!(error = %e, "completion request failed");
                return CallOutcome::Unreachable(e.to_string());
            }
        }
    }

    warn!(attempts = attempt, "rate limit retries exhausted");
    CallOutcome::RateLimited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingSleeper, ScriptedClient};
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.0-flash".into(),
            prompt: "[USER] hi\n".into(),
        }
    }

    fn secs(values: &[f64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs_f64(*s)).collect()
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, 1.5);
        assert_eq!(policy.delay_for(1), Duration::from_secs_f64(1.5));
        assert_eq!(policy.delay_for(2), Duration::from_secs_f64(3.0));
        assert_eq!(policy.delay_for(4), Duration::from_secs_f64(12.0));
    }

    #[test]
    fn invalid_base_yields_zero_delay() {
        let policy = RetryPolicy::new(5, f64::NAN);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
    }

    #[tokio::test]
    async fn five_rate_limits_sleep_then_give_up() {
        let client = ScriptedClient::new((0..5).map(|_| Err(AiError::RateLimited)));
        let sleeper = RecordingSleeper::default();

        let outcome =
            call_with_retry(&client, &sleeper, &RetryPolicy::new(5, 1.0), &request()).await;

        assert_eq!(outcome, CallOutcome::RateLimited);
        assert_eq!(sleeper.sleeps(), secs(&[1.0, 2.0, 4.0, 8.0, 16.0]));
        assert_eq!(client.request_count(), 5);
    }

    #[tokio::test]
    async fn success_after_rate_limits_stops_retrying() {
        let client = ScriptedClient::new([
            Err(AiError::RateLimited),
            Err(AiError::RateLimited),
            Ok(json!({"candidates": [{"output": {"content": "finally"}}]})),
        ]);
        let sleeper = RecordingSleeper::default();

        let outcome =
            call_with_retry(&client, &sleeper, &RetryPolicy::new(5, 2.0), &request()).await;

        assert_eq!(outcome, CallOutcome::Reply("finally".into()));
        // attempt 3 succeeded after exactly attempt-1 sleeps
        assert_eq!(sleeper.sleeps(), secs(&[2.0, 4.0]));
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn sleeps_before_each_attempt_match_attempt_minus_one() {
        for max_attempts in 1..=10u32 {
            for success_at in 1..=max_attempts {
                let mut script: Vec<Result<serde_json::Value, AiError>> = (1..success_at)
                    .map(|_| Err(AiError::RateLimited))
                    .collect();
                script.push(Ok(json!({"text": "ok"})));
                let client = ScriptedClient::new(script);
                let sleeper = RecordingSleeper::default();
                let policy = RetryPolicy::new(max_attempts, 1.0);

                let outcome = call_with_retry(&client, &sleeper, &policy, &request()).await;

                assert_eq!(outcome, CallOutcome::Reply("ok".into()));
                let expected: Vec<Duration> = (1..success_at).map(|a| policy.delay_for(a)).collect();
                assert_eq!(sleeper.sleeps(), expected);
            }
        }
    }

    #[tokio::test]
    async fn upstream_error_is_not_retried() {
        let client = ScriptedClient::new([Err(AiError::Upstream {
            status: 400,
            body: "bad request".into(),
        })]);
        let sleeper = RecordingSleeper::default();

        let outcome = call_with_retry(&client, &sleeper, &RetryPolicy::default(), &request()).await;

        assert_eq!(
            outcome,
            CallOutcome::UpstreamError {
                status: 400,
                body: "bad request".into()
            }
        );
        assert!(sleeper.sleeps().is_empty());
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn network_failure_is_unreachable() {
        let client = ScriptedClient::new([Err(AiError::NetworkError("refused".into()))]);
        let sleeper = RecordingSleeper::default();

        let outcome = call_with_retry(&client, &sleeper, &RetryPolicy::default(), &request()).await;

        match outcome {
            CallOutcome::Unreachable(reason) => assert!(reason.contains("refused")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
