//! Test doubles shared by the server's test modules.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use medidrop_ai::{AiError, CompletionClient, CompletionRequest, Sleeper};
use medidrop_config::MedidropConfig;

use crate::state::ServerState;

pub(crate) struct StubClient {
    responses: Mutex<VecDeque<Result<serde_json::Value, AiError>>>,
}

impl StubClient {
    pub(crate) fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<serde_json::Value, AiError>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<serde_json::Value, AiError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::NetworkError("no scripted response".into())))
    }
}

pub(crate) struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

/// Server state over `client` with transcript auto-logging switched off.
pub(crate) fn state_with(client: StubClient) -> ServerState {
    let mut config = MedidropConfig::default();
    config.csv_log.auto_log = false;
    ServerState::new(config, Arc::new(client), Arc::new(NoSleep))
}
