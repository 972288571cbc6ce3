//! Registry of live chat sessions, one per connected widget.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use medidrop_common::SessionId;
use tokio::sync::RwLock;

struct SessionEntry {
    peer: SocketAddr,
    connected_at: Instant,
}

/// Thread-safe session registry. Sessions themselves are owned by their
/// connection task; the registry only tracks which ones are alive.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new session. Returns the number of live sessions.
    pub async fn register(&self, id: &SessionId, peer: SocketAddr) -> usize {
        let mut map = self.sessions.write().await;
        map.insert(
            id.clone(),
            SessionEntry {
                peer,
                connected_at: Instant::now(),
            },
        );
        map.len()
    }

    /// Forget a session. Returns how long it was connected, if it was known.
    pub async fn unregister(&self, id: &SessionId) -> Option<std::time::Duration> {
        let entry = self.sessions.write().await.remove(id)?;
        tracing::debug!(session = %id, peer = %entry.peer, "Session unregistered");
        Some(entry.connected_at.elapsed())
    }

    /// Number of active sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
