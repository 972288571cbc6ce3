use serde::{Deserialize, Serialize};

/// WebSocket endpoint the chat widget connects to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Listen port (valid range: 1024-65535).
    pub port: u32,
    /// Close connections with no traffic for this many seconds (valid range: 10-86400).
    pub idle_timeout_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8501,
            idle_timeout_secs: 1800,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
