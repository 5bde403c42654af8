//! Audit trail: one sink, pluggable backends.
//!
//! Recording never fails the caller. A backend that cannot accept an entry is
//! reported on the `depotguard::audit` tracing target and counted in
//! `depotguard_audit_backend_failures_total`; the other backends still get it.

pub mod backend;
pub mod file;
pub mod sink;

pub use backend::{AuditBackend, MemoryBackend, TracingBackend};
pub use file::FileBackend;
pub use sink::AuditSink;
