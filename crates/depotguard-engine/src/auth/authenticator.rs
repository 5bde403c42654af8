use std::sync::Arc;

use depotguard_core::access::AccessMode;
use depotguard_core::audit::AuditOutcome;
use depotguard_core::error::{AuthFailure, GuardError, Result};
use depotguard_core::SecurityLevel;

use crate::access::AccessGuard;
use crate::audit::AuditSink;
use crate::input::{validate_identity, validate_token};
use crate::lockout::LockoutTracker;
use crate::ratelimit::RateLimiter;
use crate::session::{token_prefix, Session, SessionStore};

/// Action name used for login rate limiting and auditing.
const LOGIN: &str = "LOGIN";

/// Authenticated subject attributes returned by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub role: String,
    pub clearance: SecurityLevel,
}

/// Credential check supplied by the caller (password hashing, user lookup).
///
/// `Ok(None)` means the credentials were rejected; `Err` is a fault in the
/// credential store itself.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, identity: &str, secret: &str) -> Result<Option<Principal>>;
}

#[derive(Debug, Clone, Copy)]
pub struct LoginRequest<'a> {
    pub identity: &'a str,
    pub secret: &'a str,
    /// Client address, for the audit trail.
    pub source: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: String,
    pub session: Session,
}

pub struct Authenticator {
    sessions: Arc<SessionStore>,
    lockout: Arc<LockoutTracker>,
    limiter: Arc<RateLimiter>,
    access: Arc<AccessGuard>,
    audit: Arc<AuditSink>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authenticator {
    pub fn new(
        sessions: Arc<SessionStore>,
        lockout: Arc<LockoutTracker>,
        limiter: Arc<RateLimiter>,
        access: Arc<AccessGuard>,
        audit: Arc<AuditSink>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self { sessions, lockout, limiter, access, audit, verifier }
    }

    /// Authenticate and issue a session. Records exactly one `LOGIN` entry.
    pub fn login(&self, req: LoginRequest<'_>) -> Result<LoginGrant> {
        let LoginRequest { identity, secret, source } = req;

        if let Err(e) = validate_identity(identity) {
            self.audit.record(None, LOGIN, AuditOutcome::Error, source, e.to_string());
            return Err(e);
        }

        if self.lockout.is_locked(identity) {
            let detail = match self.lockout.locked_until(identity) {
                Some(until) => format!("account locked until {until}"),
                None => "account locked".to_string(),
            };
            self.audit.record(Some(identity), LOGIN, AuditOutcome::Denied, source, detail);
            return Err(GuardError::AccountLocked);
        }

        if !self.limiter.allow(identity, LOGIN, self.limiter.limit_for(LOGIN)) {
            self.audit
                .record(Some(identity), LOGIN, AuditOutcome::Denied, source, "rate limited");
            return Err(GuardError::RateLimited);
        }

        let principal = match self.verifier.verify(identity, secret) {
            Ok(Some(p)) => p,
            Ok(None) => {
                let failures = self.lockout.record_failure(identity);
                self.audit.record(
                    Some(identity),
                    LOGIN,
                    AuditOutcome::Denied,
                    source,
                    format!(
                        "invalid credentials ({failures} of {})",
                        self.lockout.threshold()
                    ),
                );
                return Err(GuardError::NotAuthenticated(AuthFailure::BadCredentials));
            }
            Err(e) => {
                tracing::error!(identity, error = %e, "credential verifier failed");
                self.audit
                    .record(Some(identity), LOGIN, AuditOutcome::Error, source, e.to_string());
                return Err(match e {
                    GuardError::Internal(_) => e,
                    other => GuardError::Internal(other.to_string()),
                });
            }
        };

        self.lockout.reset(identity);
        let token = self.sessions.create(identity, &principal.role, principal.clearance);
        let session = self
            .sessions
            .peek(&token)
            .ok_or_else(|| GuardError::Internal("session vanished right after creation".into()))?;

        self.audit.record(
            Some(identity),
            LOGIN,
            AuditOutcome::Success,
            source,
            format!("role={} clearance={}", principal.role, principal.clearance),
        );
        Ok(LoginGrant { token, session })
    }

    /// End a session. Returns whether a live session was removed.
    pub fn logout(&self, token: &str, source: Option<&str>) -> Result<bool> {
        validate_token(token)?;
        let actor = self.sessions.peek(token).map(|s| s.identity().to_string());
        let removed = self.sessions.invalidate(token);
        self.audit.record(
            actor.as_deref(),
            "LOGOUT",
            AuditOutcome::Success,
            source,
            if removed { "session invalidated" } else { "no live session" },
        );
        Ok(removed)
    }

    /// Resolve `token` and check `mode` access to an object at `required`.
    ///
    /// Every call records exactly one decision: `ACCESS` on success or when the
    /// session cannot be resolved, `BLP_*_DENIED` on a policy denial.
    pub fn authorize(
        &self,
        token: &str,
        required: SecurityLevel,
        mode: AccessMode,
        source: Option<&str>,
    ) -> Result<Session> {
        let session = match self.resolve(token) {
            Ok(s) => s,
            Err(e) => {
                let outcome = match e {
                    GuardError::InvalidInput(_) => AuditOutcome::Error,
                    _ => AuditOutcome::Denied,
                };
                self.audit.record(
                    None,
                    "ACCESS",
                    outcome,
                    source,
                    format!("{mode} {required}: {e}"),
                );
                return Err(e);
            }
        };

        self.access.authorize(&session, required, mode)?;

        tracing::trace!(identity = session.identity(), token = token_prefix(token), %mode, %required, "access granted");
        self.audit.record(
            Some(session.identity()),
            "ACCESS",
            AuditOutcome::Success,
            source,
            format!("{mode} {required} with {} clearance", session.clearance()),
        );
        Ok(session)
    }

    fn resolve(&self, token: &str) -> Result<Session> {
        if token.trim().is_empty() {
            return Err(GuardError::NotAuthenticated(AuthFailure::MissingToken));
        }
        validate_token(token)?;
        self.sessions.lookup(token)
    }
}
