use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use depotguard_core::audit::AuditOutcome;
use depotguard_core::clock::{duration_ms, Clock};
use depotguard_core::error::{AuthFailure, GuardError, Result};
use depotguard_core::SecurityLevel;

use crate::audit::AuditSink;

use super::token::{generate_token, token_prefix};

/// Read-only view of a live session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    identity: String,
    role: String,
    clearance: SecurityLevel,
    created_at_ms: u64,
    expires_at_ms: u64,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }
    pub fn identity(&self) -> &str {
        &self.identity
    }
    /// Informational only; MAC decisions use `clearance`.
    pub fn role(&self) -> &str {
        &self.role
    }
    pub fn clearance(&self) -> SecurityLevel {
        self.clearance
    }
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
    pub fn expires_at_ms(&self) -> u64 {
        self.expires_at_ms
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &format_args!("{}…", token_prefix(&self.token)))
            .field("identity", &self.identity)
            .field("role", &self.role)
            .field("clearance", &self.clearance)
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Live sessions keyed by token.
///
/// Backed by a sharded map: `lookup` takes the shard write guard for its token
/// only, so the expiry check and the sliding extension happen as one step per
/// key while other tokens proceed in parallel.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
    audit: Arc<AuditSink>,
}

impl SessionStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>, audit: Arc<AuditSink>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_ms: duration_ms(ttl).max(1),
            clock,
            audit,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Issue a new session and return its token.
    pub fn create(&self, identity: &str, role: &str, clearance: SecurityLevel) -> String {
        let now = self.clock.now_ms();
        let token = generate_token();
        let session = Session {
            token: token.clone(),
            identity: identity.to_string(),
            role: role.to_string(),
            clearance,
            created_at_ms: now,
            expires_at_ms: now.saturating_add(self.ttl_ms),
        };
        self.sessions.insert(token.clone(), session);

        tracing::debug!(identity, token = token_prefix(&token), %clearance, role, "session created");
        token
    }

    /// Resolve a token, sliding its expiry forward on success.
    ///
    /// An expired entry is removed here (lazy purge) and reported as
    /// `NotAuthenticated(Expired)`; an absent one as `NotAuthenticated(UnknownToken)`.
    pub fn lookup(&self, token: &str) -> Result<Session> {
        let now = self.clock.now_ms();

        match self.sessions.get_mut(token) {
            None => return Err(GuardError::NotAuthenticated(AuthFailure::UnknownToken)),
            Some(mut entry) => {
                if now <= entry.expires_at_ms {
                    // `now` was read before the guard; never move expiry backwards.
                    entry.expires_at_ms = entry.expires_at_ms.max(now.saturating_add(self.ttl_ms));
                    return Ok(entry.value().clone());
                }
            }
        }

        // Guard dropped above; re-check under the removal lock so an entry
        // extended in between is left alone.
        let removed = self
            .sessions
            .remove_if(token, |_, s| now > s.expires_at_ms);
        match removed {
            Some((_, s)) => {
                tracing::debug!(identity = %s.identity, token = token_prefix(token), "session expired");
                self.audit.record(
                    Some(&s.identity),
                    "SESSION_EXPIRED",
                    AuditOutcome::Denied,
                    None,
                    "session removed on access after expiry",
                );
                Err(GuardError::NotAuthenticated(AuthFailure::Expired))
            }
            None if self.sessions.contains_key(token) => self.lookup(token),
            None => Err(GuardError::NotAuthenticated(AuthFailure::Expired)),
        }
    }

    /// Current view without touching the expiry.
    pub fn peek(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|s| s.value().clone())
    }

    /// Remove a session. Idempotent; returns whether an entry was removed.
    pub fn invalidate(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, s)) => {
                tracing::debug!(identity = %s.identity, token = token_prefix(token), "session invalidated");
                true
            }
            None => false,
        }
    }

    /// Drop every expired entry. Optional housekeeping; lookups purge lazily anyway.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now <= s.expires_at_ms);
        before.saturating_sub(self.sessions.len())
    }

    /// Number of stored sessions (expired entries not yet purged included).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
