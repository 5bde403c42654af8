use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use depotguard_core::audit::AuditOutcome;
use depotguard_core::clock::{duration_ms, Clock};

use crate::audit::AuditSink;

/// Failure state for one identity.
///
/// A `locked_until_ms` in the past is equivalent to "not locked".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockoutRecord {
    pub failure_count: u32,
    pub locked_until_ms: Option<u64>,
}

impl LockoutRecord {
    pub fn is_locked(&self, now_ms: u64) -> bool {
        matches!(self.locked_until_ms, Some(until) if now_ms < until)
    }
}

/// Two-state (Unlocked / Locked) machine per identity.
///
/// Every transition runs under the map entry's shard lock, so simultaneous
/// failures for one identity are counted exactly once each.
pub struct LockoutTracker {
    records: DashMap<String, LockoutRecord>,
    threshold: u32,
    duration_ms: u64,
    clock: Arc<dyn Clock>,
    audit: Arc<AuditSink>,
}

impl LockoutTracker {
    pub fn new(
        threshold: u32,
        duration: Duration,
        clock: Arc<dyn Clock>,
        audit: Arc<AuditSink>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            threshold: threshold.max(1),
            duration_ms: duration_ms(duration),
            clock,
            audit,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn lockout_duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Count a failed attempt.
    ///
    /// Returns the failure count after this attempt (equal to the threshold on
    /// the attempt that locks), or 0 when the identity is already locked and
    /// nothing was counted.
    pub fn record_failure(&self, identity: &str) -> u32 {
        let now = self.clock.now_ms();

        let (count, locked_until) = {
            let mut rec = self.records.entry(identity.to_string()).or_default();
            if rec.is_locked(now) {
                return 0;
            }
            // A lapsed lock carries no state forward.
            rec.locked_until_ms = None;
            rec.failure_count = rec.failure_count.saturating_add(1);
            let count = rec.failure_count;

            if count >= self.threshold {
                let until = now.saturating_add(self.duration_ms);
                rec.locked_until_ms = Some(until);
                // Reset so the account does not re-lock from a stale counter once this lapses.
                rec.failure_count = 0;
                (count, Some(until))
            } else {
                (count, None)
            }
        };

        match locked_until {
            Some(until) => {
                self.audit.metrics().lockout_transitions.inc(&[]);
                tracing::warn!(identity, failures = count, until_ms = until, "account locked");
                self.audit.record(
                    Some(identity),
                    "ACCOUNT_LOCKED",
                    AuditOutcome::Denied,
                    None,
                    format!(
                        "locked after {count} failed attempts for {}s",
                        self.duration_ms / 1000
                    ),
                );
            }
            None => {
                tracing::debug!(identity, failures = count, "failed login attempt counted");
                self.audit.record(
                    Some(identity),
                    "FAILED_LOGIN_ATTEMPT",
                    AuditOutcome::Denied,
                    None,
                    format!("failed attempt {count} of {}", self.threshold),
                );
            }
        }
        count
    }

    /// True iff a lock is set and has not lapsed.
    pub fn is_locked(&self, identity: &str) -> bool {
        let now = self.clock.now_ms();
        self.records
            .get(identity)
            .map(|r| r.is_locked(now))
            .unwrap_or(false)
    }

    /// Clear failures and any lock (successful authentication or admin action).
    pub fn reset(&self, identity: &str) {
        if let Some((_, prev)) = self.records.remove(identity) {
            if prev != LockoutRecord::default() {
                self.audit.record(
                    Some(identity),
                    "LOCKOUT_RESET",
                    AuditOutcome::Success,
                    None,
                    "failed attempts reset",
                );
            }
        }
    }

    /// Attempts left before the next lock; 0 while locked.
    pub fn remaining_attempts(&self, identity: &str) -> u32 {
        let now = self.clock.now_ms();
        match self.records.get(identity) {
            Some(r) if r.is_locked(now) => 0,
            Some(r) => self.threshold.saturating_sub(r.failure_count),
            None => self.threshold,
        }
    }

    /// End of the active lock, if any.
    pub fn locked_until(&self, identity: &str) -> Option<u64> {
        let now = self.clock.now_ms();
        self.records
            .get(identity)
            .and_then(|r| r.locked_until_ms.filter(|until| now < *until))
    }

    /// Current record, if the identity has any state.
    pub fn record(&self, identity: &str) -> Option<LockoutRecord> {
        self.records.get(identity).map(|r| *r)
    }
}
