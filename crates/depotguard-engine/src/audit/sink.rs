use std::sync::Arc;

use depotguard_core::audit::{AuditEntry, AuditOutcome};
use depotguard_core::clock::{timestamp_from_ms, Clock};
use depotguard_core::error::{GuardError, Result};

use crate::config::{AuditBackendKind, AuditSection};
use crate::obs::SecurityMetrics;

use super::backend::{AuditBackend, MemoryBackend, TracingBackend};
use super::file::FileBackend;

/// Append-only recorder shared by every security component.
pub struct AuditSink {
    clock: Arc<dyn Clock>,
    metrics: Arc<SecurityMetrics>,
    backends: Vec<Arc<dyn AuditBackend>>,
    memory: Option<Arc<MemoryBackend>>,
}

impl AuditSink {
    pub fn new(clock: Arc<dyn Clock>, metrics: Arc<SecurityMetrics>) -> Self {
        Self {
            clock,
            metrics,
            backends: Vec::new(),
            memory: None,
        }
    }

    /// Sink with only an in-memory backend; handy for tests and tooling.
    pub fn in_memory(clock: Arc<dyn Clock>, capacity: usize) -> Self {
        let mut sink = Self::new(clock, Arc::new(SecurityMetrics::new()));
        sink.memory = Some(Arc::new(MemoryBackend::new(capacity)));
        sink
    }

    /// Build the backends listed in config. Startup errors (e.g. an
    /// unwritable audit file) are returned rather than swallowed.
    pub fn from_config(
        cfg: &AuditSection,
        clock: Arc<dyn Clock>,
        metrics: Arc<SecurityMetrics>,
    ) -> Result<Self> {
        let mut sink = Self::new(clock, metrics);
        for kind in &cfg.backends {
            match kind {
                AuditBackendKind::Memory => {
                    if sink.memory.is_none() {
                        sink.memory = Some(Arc::new(MemoryBackend::new(cfg.memory_capacity)));
                    }
                }
                AuditBackendKind::File => {
                    let path = cfg.file_path.as_deref().unwrap_or_default();
                    let file = FileBackend::open(path, cfg.queue_capacity)?;
                    tracing::info!(path = %file.path().display(), "audit file backend enabled");
                    sink.backends.push(Arc::new(file));
                }
                AuditBackendKind::Tracing => sink.backends.push(Arc::new(TracingBackend)),
            }
        }
        if sink.memory.is_none() && sink.backends.is_empty() {
            tracing::warn!("no audit backend configured; entries only reach the metrics counters");
        }
        Ok(sink)
    }

    /// Attach an additional backend.
    pub fn with_backend(mut self, backend: Arc<dyn AuditBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Append one entry. Never fails and never blocks on a slow backend.
    pub fn record(
        &self,
        actor: Option<&str>,
        action: &str,
        outcome: AuditOutcome,
        source: Option<&str>,
        detail: impl Into<String>,
    ) {
        let entry = AuditEntry::new(
            timestamp_from_ms(self.clock.now_ms()),
            actor,
            action,
            outcome,
            source,
            detail,
        );

        self.metrics
            .audit_events
            .inc(&[("action", action), ("outcome", outcome.as_str())]);

        if let Some(m) = &self.memory {
            match m.push(&entry) {
                Ok(None) => {}
                Ok(Some(old)) => {
                    self.metrics.audit_evictions.inc(&[("backend", m.name())]);
                    tracing::warn!(
                        target: "depotguard::audit",
                        backend = m.name(),
                        line = %old.to_line(),
                        "memory audit ring full; oldest entry evicted"
                    );
                }
                Err(e) => self.on_backend_failure(m.name(), &e, &entry),
            }
        }

        for backend in &self.backends {
            if let Err(e) = backend.append(&entry) {
                self.on_backend_failure(backend.name(), &e, &entry);
            }
        }
    }

    fn on_backend_failure(&self, name: &'static str, e: &GuardError, entry: &AuditEntry) {
        self.metrics.audit_backend_failures.inc(&[("backend", name)]);
        tracing::error!(
            target: "depotguard::audit",
            backend = name,
            error = %e,
            line = %entry.to_line(),
            "audit backend unavailable"
        );
    }

    /// In-memory backend, when configured.
    pub fn memory(&self) -> Option<&MemoryBackend> {
        self.memory.as_deref()
    }

    pub fn metrics(&self) -> &SecurityMetrics {
        &self.metrics
    }

    /// Flush and close every backend.
    pub fn close(&self) {
        for b in &self.backends {
            b.close();
        }
    }
}
