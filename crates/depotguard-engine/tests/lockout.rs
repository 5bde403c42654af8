#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use depotguard_core::audit::AuditOutcome;
use depotguard_core::clock::Clock;
use depotguard_engine::lockout::LockoutTracker;

mod common;
use common::fixture;

const LOCK: Duration = Duration::from_secs(1800);

fn tracker(f: &common::Fixture) -> LockoutTracker {
    LockoutTracker::new(3, LOCK, f.clock.clone(), f.audit.clone())
}

#[test]
fn third_failure_locks_for_thirty_minutes() {
    let f = fixture();
    let t = tracker(&f);

    assert_eq!(t.record_failure("bob"), 1);
    assert_eq!(t.record_failure("bob"), 2);
    assert!(!t.is_locked("bob"));
    assert_eq!(t.remaining_attempts("bob"), 1);

    assert_eq!(t.record_failure("bob"), 3);
    assert!(t.is_locked("bob"));
    assert_eq!(t.remaining_attempts("bob"), 0);
    assert_eq!(t.locked_until("bob"), Some(f.clock.now_ms() + 1_800_000));

    assert_eq!(f.count("FAILED_LOGIN_ATTEMPT", AuditOutcome::Denied), 2);
    assert_eq!(f.count("ACCOUNT_LOCKED", AuditOutcome::Denied), 1);
    assert_eq!(f.audit.metrics().lockout_transitions.get(&[]), 1);
}

#[test]
fn failures_while_locked_are_not_counted() {
    let f = fixture();
    let t = tracker(&f);
    for _ in 0..3 {
        t.record_failure("bob");
    }
    let until = t.locked_until("bob").unwrap();

    f.clock.advance(Duration::from_secs(60));
    assert_eq!(t.record_failure("bob"), 0);
    assert_eq!(t.locked_until("bob"), Some(until));
    assert_eq!(f.count("ACCOUNT_LOCKED", AuditOutcome::Denied), 1);
}

#[test]
fn reset_before_threshold_clears_the_count() {
    let f = fixture();
    let t = tracker(&f);
    t.record_failure("bob");
    t.record_failure("bob");
    t.reset("bob");

    assert!(t.record("bob").is_none());
    assert_eq!(t.record_failure("bob"), 1);
    assert!(!t.is_locked("bob"));
    assert_eq!(f.count("LOCKOUT_RESET", AuditOutcome::Success), 1);
}

#[test]
fn reset_of_unknown_identity_is_silent() {
    let f = fixture();
    let t = tracker(&f);
    t.reset("nobody");
    assert!(f.entries().is_empty());
}

#[test]
fn reset_clears_an_active_lock() {
    let f = fixture();
    let t = tracker(&f);
    for _ in 0..3 {
        t.record_failure("bob");
    }
    t.reset("bob");
    assert!(!t.is_locked("bob"));
    assert_eq!(t.remaining_attempts("bob"), 3);
}

#[test]
fn lock_lapses_and_counting_restarts() {
    let f = fixture();
    let t = tracker(&f);
    for _ in 0..3 {
        t.record_failure("bob");
    }

    f.clock.advance(LOCK - Duration::from_millis(1));
    assert!(t.is_locked("bob"));

    f.clock.advance(Duration::from_millis(1));
    assert!(!t.is_locked("bob"));
    assert_eq!(t.locked_until("bob"), None);
    assert_eq!(t.remaining_attempts("bob"), 3);

    assert_eq!(t.record_failure("bob"), 1);
    assert_eq!(t.record("bob").unwrap().locked_until_ms, None);
}

#[test]
fn identities_are_independent() {
    let f = fixture();
    let t = tracker(&f);
    for _ in 0..3 {
        t.record_failure("bob");
    }
    assert!(t.is_locked("bob"));
    assert!(!t.is_locked("alice"));
    assert_eq!(t.record_failure("alice"), 1);
}

#[test]
fn concurrent_failures_lock_exactly_once() {
    for _ in 0..50 {
        let f = fixture();
        let t = Arc::new(tracker(&f));
        let n = t.threshold() as usize;
        let barrier = Arc::new(Barrier::new(n));

        let handles: Vec<_> = (0..n)
            .map(|_| {
                let t = Arc::clone(&t);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    t.record_failure("bob")
                })
            })
            .collect();

        let mut results: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort_unstable();

        assert_eq!(results, vec![1, 2, 3]);
        assert!(t.is_locked("bob"));
        assert_eq!(f.count("ACCOUNT_LOCKED", AuditOutcome::Denied), 1);
        assert_eq!(f.audit.metrics().lockout_transitions.get(&[]), 1);
    }
}

#[test]
fn threshold_of_zero_is_raised_to_one() {
    let f = fixture();
    let t = LockoutTracker::new(0, LOCK, f.clock.clone(), f.audit.clone());
    assert_eq!(t.threshold(), 1);
    assert_eq!(t.record_failure("bob"), 1);
    assert!(t.is_locked("bob"));
}
