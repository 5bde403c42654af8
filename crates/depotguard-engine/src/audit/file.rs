//! Append-only file backend.
//!
//! Callers hand lines to a bounded queue with `try_send`; a dedicated writer
//! thread drains it into the file. A full or closed queue is reported as a
//! backend failure instead of blocking the security decision.

use std::fs::OpenOptions;
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::thread::JoinHandle;

use tokio::sync::mpsc::{self, error::TrySendError};

use depotguard_core::audit::AuditEntry;
use depotguard_core::error::{GuardError, Result};

use super::backend::AuditBackend;

pub struct FileBackend {
    path: PathBuf,
    tx: RwLock<Option<mpsc::Sender<String>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl FileBackend {
    /// Open (or create) `path` for appending and start the writer thread.
    pub fn open(path: impl AsRef<Path>, queue_capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                GuardError::Internal(format!("open audit file {} failed: {e}", path.display()))
            })?;

        let (tx, mut rx) = mpsc::channel::<String>(queue_capacity.max(1));
        let thread_path = path.clone();
        let writer = std::thread::Builder::new()
            .name("depotguard-audit".into())
            .spawn(move || {
                let mut out = LineWriter::new(file);
                while let Some(line) = rx.blocking_recv() {
                    if let Err(e) = writeln!(out, "{line}") {
                        tracing::error!(
                            target: "depotguard::audit",
                            path = %thread_path.display(),
                            error = %e,
                            %line,
                            "audit file write failed"
                        );
                    }
                }
                let _ = out.flush();
            })
            .map_err(|e| GuardError::Internal(format!("spawn audit writer failed: {e}")))?;

        Ok(Self {
            path,
            tx: RwLock::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn append(&self, entry: &AuditEntry) -> Result<()> {
        let guard = self
            .tx
            .read()
            .map_err(|_| GuardError::Internal("audit queue lock poisoned".into()))?;
        let tx = guard
            .as_ref()
            .ok_or_else(|| GuardError::Internal("audit file backend closed".into()))?;
        tx.try_send(entry.to_line()).map_err(|e| match e {
            TrySendError::Full(_) => GuardError::Internal("audit queue full".into()),
            TrySendError::Closed(_) => GuardError::Internal("audit writer stopped".into()),
        })
    }

    /// Drop the sender, let the writer drain the queue, then join it.
    fn close(&self) {
        if let Ok(mut g) = self.tx.write() {
            g.take();
        }
        let handle = self.writer.lock().ok().and_then(|mut g| g.take());
        if let Some(h) = handle {
            if h.join().is_err() {
                tracing::error!(target: "depotguard::audit", "audit writer thread panicked");
            }
        }
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        self.close();
    }
}
