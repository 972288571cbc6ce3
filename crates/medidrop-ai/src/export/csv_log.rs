//! Append-mode transcript log shared by all sessions of a process.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use medidrop_common::SessionId;
use tracing::{debug, warn};

use crate::Message;

use super::transcript::write_rows;
use super::ExportError;

/// Handle to one CSV log file. Clones share a lock, so every session of a
/// process must append through clones of the same handle.
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows for `messages`. BOM and header are written only when
    /// the file is new or empty. If the file cannot be opened for append
    /// it is rewritten from scratch.
    ///
    /// Blocking; async callers use [`CsvLog::append_async`].
    pub fn append(&self, session_id: &SessionId, messages: &[Message]) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Header check and write happen under one lock.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let is_new = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        match OpenOptions::new().create(true).append(true).open(&self.path) {
            Ok(file) => write_all_rows(file, session_id, messages, is_new)?,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "append failed, rewriting csv log");
                let file = File::create(&self.path)?;
                write_all_rows(file, session_id, messages, true)?;
            }
        }

        debug!(path = %self.path.display(), rows = messages.len(), "appended to csv log");
        Ok(())
    }

    /// [`CsvLog::append`] on the blocking thread pool.
    pub async fn append_async(
        &self,
        session_id: SessionId,
        messages: Vec<Message>,
    ) -> Result<(), ExportError> {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.append(&session_id, &messages))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))?
    }
}

/// Render the rows in memory and hand them to the file in one write.
fn write_all_rows(
    mut file: File,
    session_id: &SessionId,
    messages: &[Message],
    with_header: bool,
) -> Result<(), ExportError> {
    let mut buf = Vec::new();
    write_rows(&mut buf, session_id, messages, with_header)?;
    file.write_all(&buf)?;
    file.flush()?;
    Ok(())
}
