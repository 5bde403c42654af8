#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use depotguard_core::audit::AuditOutcome;
use depotguard_core::clock::Clock;
use depotguard_core::error::{AuthFailure, GuardError};
use depotguard_core::SecurityLevel;
use depotguard_engine::session::{SessionStore, TOKEN_HEX_LEN};

mod common;
use common::fixture;

const TTL: Duration = Duration::from_secs(3600);

fn store(f: &common::Fixture) -> SessionStore {
    SessionStore::new(TTL, f.clock.clone(), f.audit.clone())
}

#[test]
fn created_session_is_valid_immediately() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("alice", "driver", SecurityLevel::Confidential);

    assert_eq!(token.len(), TOKEN_HEX_LEN);
    let session = s.lookup(&token).unwrap();
    assert_eq!(session.identity(), "alice");
    assert_eq!(session.role(), "driver");
    assert_eq!(session.clearance(), SecurityLevel::Confidential);
    assert_eq!(session.token(), token);
}

#[test]
fn tokens_are_unique_and_hex() {
    let f = fixture();
    let s = store(&f);
    let tokens: HashSet<String> = (0..500)
        .map(|_| s.create("bob", "customer", SecurityLevel::Unclassified))
        .collect();
    assert_eq!(tokens.len(), 500);
    assert!(tokens
        .iter()
        .all(|t| t.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())));
}

#[test]
fn lookup_just_before_expiry_slides_the_window() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("alice", "driver", SecurityLevel::Secret);

    f.clock.advance(TTL - Duration::from_secs(1));
    let session = s.lookup(&token).unwrap();
    assert_eq!(session.expires_at_ms(), f.clock.now_ms() + 3_600_000);

    // Past the first expiry, but within the extended one.
    f.clock.advance(Duration::from_secs(10));
    assert!(s.lookup(&token).is_ok());
}

#[test]
fn lookup_exactly_at_expiry_is_still_valid() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("alice", "driver", SecurityLevel::Secret);
    f.clock.advance(TTL);
    assert!(s.lookup(&token).is_ok());
}

#[test]
fn lookup_after_expiry_returns_expired_then_not_found() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("alice", "driver", SecurityLevel::Secret);

    f.clock.advance(TTL + Duration::from_millis(1));
    assert_eq!(
        s.lookup(&token).unwrap_err(),
        GuardError::NotAuthenticated(AuthFailure::Expired)
    );
    assert!(s.is_empty());
    assert_eq!(
        s.lookup(&token).unwrap_err(),
        GuardError::NotAuthenticated(AuthFailure::UnknownToken)
    );
    assert_eq!(f.count("SESSION_EXPIRED", AuditOutcome::Denied), 1);
}

#[test]
fn unknown_token_is_not_found() {
    let f = fixture();
    let s = store(&f);
    let err = s.lookup(&"0".repeat(TOKEN_HEX_LEN)).unwrap_err();
    assert_eq!(err, GuardError::NotAuthenticated(AuthFailure::UnknownToken));
    assert_eq!(err.client_code().as_str(), "NOT_AUTHENTICATED");
}

#[test]
fn invalidate_is_idempotent() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("carol", "admin", SecurityLevel::TopSecret);

    assert!(s.invalidate(&token));
    assert!(!s.invalidate(&token));
    assert_eq!(
        s.lookup(&token).unwrap_err(),
        GuardError::NotAuthenticated(AuthFailure::UnknownToken)
    );
}

#[test]
fn peek_does_not_extend() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("alice", "driver", SecurityLevel::Secret);
    let before = s.peek(&token).unwrap().expires_at_ms();
    f.clock.advance(Duration::from_secs(30));
    assert_eq!(s.peek(&token).unwrap().expires_at_ms(), before);
}

#[test]
fn purge_expired_only_drops_lapsed_sessions() {
    let f = fixture();
    let s = store(&f);
    let old = s.create("alice", "driver", SecurityLevel::Secret);
    f.clock.advance(Duration::from_secs(1800));
    let fresh = s.create("bob", "driver", SecurityLevel::Secret);
    f.clock.advance(Duration::from_secs(1801));

    assert_eq!(s.purge_expired(), 1);
    assert!(s.peek(&old).is_none());
    assert!(s.peek(&fresh).is_some());
}

#[test]
fn debug_output_hides_the_token() {
    let f = fixture();
    let s = store(&f);
    let token = s.create("alice", "driver", SecurityLevel::Secret);
    let dbg = format!("{:?}", s.peek(&token).unwrap());
    assert!(!dbg.contains(&token));
    assert!(dbg.contains(&token[..8]));
}

#[test]
fn concurrent_lookups_never_lose_an_extension() {
    let f = fixture();
    let s = Arc::new(store(&f));
    let token = s.create("alice", "driver", SecurityLevel::Secret);

    f.clock.advance(Duration::from_secs(100));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = Arc::clone(&s);
            let token = token.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    s.lookup(&token).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let expected = f.clock.now_ms() + 3_600_000;
    assert_eq!(s.peek(&token).unwrap().expires_at_ms(), expected);
}

/// Clock whose first lookup reading stalls until the test releases it.
struct StallingClock {
    calls: AtomicUsize,
    read: Barrier,
    release: Barrier,
}

impl Clock for StallingClock {
    fn now_ms(&self) -> u64 {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => 0,
            1 => {
                self.read.wait();
                self.release.wait();
                100_000
            }
            _ => 200_000,
        }
    }
}

#[test]
fn late_lookup_with_older_reading_keeps_the_newer_expiry() {
    let f = fixture();
    let clock = Arc::new(StallingClock {
        calls: AtomicUsize::new(0),
        read: Barrier::new(2),
        release: Barrier::new(2),
    });
    let s = Arc::new(SessionStore::new(TTL, clock.clone(), f.audit.clone()));
    let token = s.create("alice", "driver", SecurityLevel::Secret);

    let slow = {
        let s = Arc::clone(&s);
        let token = token.clone();
        thread::spawn(move || s.lookup(&token).unwrap())
    };

    clock.read.wait();
    let fast = s.lookup(&token).unwrap();
    assert_eq!(fast.expires_at_ms(), 200_000 + 3_600_000);
    clock.release.wait();

    let slow = slow.join().unwrap();
    assert_eq!(slow.expires_at_ms(), 200_000 + 3_600_000);
    assert_eq!(s.peek(&token).unwrap().expires_at_ms(), 200_000 + 3_600_000);
}
