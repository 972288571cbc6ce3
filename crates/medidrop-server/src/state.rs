//! Process-wide state shared by every connection task.

use std::sync::Arc;
use std::time::Duration;

use medidrop_ai::{CompletionClient, CsvLog, Sleeper};
use medidrop_config::MedidropConfig;

use crate::registry::SessionRegistry;

pub struct ServerState {
    pub config: MedidropConfig,
    pub client: Arc<dyn CompletionClient>,
    pub sleeper: Arc<dyn Sleeper>,
    pub registry: SessionRegistry,
    /// The one handle every session appends through.
    pub csv_log: CsvLog,
}

impl ServerState {
    pub fn new(
        config: MedidropConfig,
        client: Arc<dyn CompletionClient>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let csv_log = CsvLog::new(config.csv_log.resolved_path());
        Self {
            config,
            client,
            sleeper,
            registry: SessionRegistry::new(),
            csv_log,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.server.idle_timeout_secs))
    }
}
