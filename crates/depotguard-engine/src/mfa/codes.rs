use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::Rng;

use depotguard_core::audit::AuditOutcome;
use depotguard_core::clock::{duration_ms, Clock};
use depotguard_core::error::{GuardError, Result};

use crate::audit::AuditSink;

pub const CODE_LEN: usize = 6;

#[derive(Debug, Clone)]
struct CodeRecord {
    code: String,
    expires_at_ms: u64,
}

pub struct OneTimeCodes {
    codes: DashMap<String, CodeRecord>,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
    audit: Arc<AuditSink>,
}

impl OneTimeCodes {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>, audit: Arc<AuditSink>) -> Self {
        Self {
            codes: DashMap::new(),
            ttl_ms: duration_ms(ttl),
            clock,
            audit,
        }
    }

    /// Issue a fresh code, replacing any outstanding one for `identity`.
    pub fn issue(&self, identity: &str) -> String {
        let code = OsRng.gen_range(100_000u32..1_000_000).to_string();
        let expires_at_ms = self.clock.now_ms().saturating_add(self.ttl_ms);
        self.codes.insert(
            identity.to_string(),
            CodeRecord { code: code.clone(), expires_at_ms },
        );
        self.audit.record(
            Some(identity),
            "MFA_CODE_ISSUED",
            AuditOutcome::Success,
            None,
            format!("expires in {}s", self.ttl_ms / 1000),
        );
        code
    }

    /// Check and consume a code.
    ///
    /// `Ok(false)` when no code is outstanding, it expired or it does not
    /// match. A matching code is removed, so it cannot be replayed.
    pub fn verify(&self, identity: &str, code: &str) -> Result<bool> {
        if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GuardError::InvalidInput("invalid one-time code format".into()));
        }
        let now = self.clock.now_ms();

        let consumed = self
            .codes
            .remove_if(identity, |_, r| now <= r.expires_at_ms && same_code(&r.code, code));

        let (ok, detail) = match consumed {
            Some(_) => (true, "code validated"),
            None => {
                // Drop a lapsed code so it stops occupying the slot.
                let expired = self
                    .codes
                    .remove_if(identity, |_, r| now > r.expires_at_ms)
                    .is_some();
                (false, if expired { "code expired" } else { "invalid or missing code" })
            }
        };

        self.audit.record(
            Some(identity),
            "MFA_VALIDATION",
            if ok { AuditOutcome::Success } else { AuditOutcome::Denied },
            None,
            detail,
        );
        Ok(ok)
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.codes.len();
        self.codes.retain(|_, r| now <= r.expires_at_ms);
        before.saturating_sub(self.codes.len())
    }
}

/// Comparison whose running time does not depend on where the codes differ.
fn same_code(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
