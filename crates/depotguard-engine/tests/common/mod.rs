//! Shared fixtures: a manual clock and an in-memory audit sink.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::Arc;

use depotguard_core::audit::{AuditEntry, AuditOutcome};
use depotguard_core::clock::ManualClock;
use depotguard_engine::audit::AuditSink;

/// 2024-01-01T00:00:00Z
pub const START_MS: u64 = 1_704_067_200_000;

pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub audit: Arc<AuditSink>,
}

pub fn fixture() -> Fixture {
    let clock = Arc::new(ManualClock::new(START_MS));
    let audit = Arc::new(AuditSink::in_memory(clock.clone(), 10_000));
    Fixture { clock, audit }
}

impl Fixture {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.audit.memory().expect("memory backend").snapshot()
    }

    pub fn actions(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.action).collect()
    }

    pub fn count(&self, action: &str, outcome: AuditOutcome) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.action == action && e.outcome == outcome)
            .count()
    }
}
