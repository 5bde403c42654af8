use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use depotguard_core::audit::AuditEntry;
use depotguard_core::error::{GuardError, Result};

/// Destination for audit entries.
pub trait AuditBackend: Send + Sync {
    /// Short name used in metrics labels and fallback logs.
    fn name(&self) -> &'static str;

    /// Accept one entry. Must not block for unbounded time.
    fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// Flush and release resources. Later appends fail.
    fn close(&self) {}
}

/// Bounded in-memory ring; once full, each append evicts the oldest entry.
///
/// Evictions are counted here and reported by `AuditSink` on the fallback
/// channel, so retention loss is never silent.
pub struct MemoryBackend {
    capacity: usize,
    entries: Mutex<VecDeque<AuditEntry>>,
    evicted: AtomicU64,
}

impl MemoryBackend {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            evicted: AtomicU64::new(0),
        }
    }

    /// Append `entry`, returning the entry evicted to make room, if any.
    pub fn push(&self, entry: &AuditEntry) -> Result<Option<AuditEntry>> {
        // A poisoned buffer is reported as a backend failure, not a panic.
        let mut g = self
            .entries
            .lock()
            .map_err(|_| GuardError::Internal("memory audit buffer poisoned".into()))?;
        let evicted = if g.len() >= self.capacity { g.pop_front() } else { None };
        g.push_back(entry.clone());
        drop(g);
        if evicted.is_some() {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        Ok(evicted)
    }

    /// Entries evicted since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        let g = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        g.iter().cloned().collect()
    }

    pub fn entries_for_actor(&self, actor: &str) -> Vec<AuditEntry> {
        let g = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        g.iter()
            .filter(|e| e.actor.as_deref() == Some(actor))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn append(&self, entry: &AuditEntry) -> Result<()> {
        if let Some(old) = self.push(entry)? {
            tracing::warn!(
                target: "depotguard::audit",
                capacity = self.capacity,
                line = %old.to_line(),
                "memory audit ring full; oldest entry evicted"
            );
        }
        Ok(())
    }
}

/// Emits each entry as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct TracingBackend;

impl AuditBackend for TracingBackend {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn append(&self, entry: &AuditEntry) -> Result<()> {
        tracing::info!(
            target: "depotguard::audit::trail",
            actor = entry.actor.as_deref().unwrap_or("-"),
            action = %entry.action,
            outcome = %entry.outcome,
            source = entry.source.as_deref().unwrap_or("-"),
            detail = %entry.detail,
            "audit"
        );
        Ok(())
    }
}
