use std::sync::Arc;

use depotguard_core::access::{check_access, classify, AccessMode};
use depotguard_core::audit::AuditOutcome;
use depotguard_core::error::{GuardError, Result};
use depotguard_core::SecurityLevel;

use crate::audit::AuditSink;
use crate::session::Session;

pub struct AccessGuard {
    audit: Arc<AuditSink>,
}

impl AccessGuard {
    pub fn new(audit: Arc<AuditSink>) -> Self {
        Self { audit }
    }

    /// No read up. Records `BLP_READ_DENIED` on denial.
    pub fn check_read(&self, actor: Option<&str>, clearance: SecurityLevel, object: SecurityLevel) -> bool {
        self.check(actor, clearance, object, AccessMode::Read)
    }

    /// No write down. Records `BLP_WRITE_DENIED` on denial.
    pub fn check_write(&self, actor: Option<&str>, clearance: SecurityLevel, object: SecurityLevel) -> bool {
        self.check(actor, clearance, object, AccessMode::Write)
    }

    pub fn check(
        &self,
        actor: Option<&str>,
        clearance: SecurityLevel,
        object: SecurityLevel,
        mode: AccessMode,
    ) -> bool {
        let allowed = check_access(clearance, object, mode);
        if !allowed {
            let action = match mode {
                AccessMode::Read => "BLP_READ_DENIED",
                AccessMode::Write => "BLP_WRITE_DENIED",
            };
            self.audit
                .metrics()
                .access_denials
                .inc(&[("mode", mode.as_str())]);
            self.audit.record(
                actor,
                action,
                AuditOutcome::Denied,
                None,
                format!("{mode} denied: {clearance} clearance against {object} data"),
            );
        }
        allowed
    }

    /// Decide for a resolved session; `AccessDenied` carries both levels.
    pub fn authorize(&self, session: &Session, required: SecurityLevel, mode: AccessMode) -> Result<()> {
        if self.check(Some(session.identity()), session.clearance(), required, mode) {
            Ok(())
        } else {
            Err(GuardError::AccessDenied {
                clearance: session.clearance(),
                required,
                mode,
            })
        }
    }

    /// `authorize` against the classification of a business data category.
    pub fn authorize_data(&self, session: &Session, data_type: &str, mode: AccessMode) -> Result<()> {
        self.authorize(session, classify(data_type), mode)
    }
}
