//! Process-wide security state, built once and shared by handle.
//!
//! Each component owns its map; collaborators receive `Arc` handles from here
//! instead of reaching for globals.

use std::sync::Arc;

use depotguard_core::clock::Clock;
use depotguard_core::error::Result;

use crate::access::AccessGuard;
use crate::audit::AuditSink;
use crate::auth::{Authenticator, CredentialVerifier};
use crate::config::SecurityConfig;
use crate::lockout::LockoutTracker;
use crate::mfa::OneTimeCodes;
use crate::obs::SecurityMetrics;
use crate::ratelimit::RateLimiter;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct SecurityCore {
    inner: Arc<SecurityCoreInner>,
}

struct SecurityCoreInner {
    cfg: SecurityConfig,
    metrics: Arc<SecurityMetrics>,
    audit: Arc<AuditSink>,
    sessions: Arc<SessionStore>,
    lockout: Arc<LockoutTracker>,
    limiter: Arc<RateLimiter>,
    access: Arc<AccessGuard>,
    codes: Arc<OneTimeCodes>,
}

impl SecurityCore {
    /// Build every component from a validated config.
    /// Returns Result so startup failures (e.g. audit file) reach the caller.
    pub fn from_config(cfg: SecurityConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        cfg.validate()?;

        let metrics = Arc::new(SecurityMetrics::new());
        let audit = Arc::new(AuditSink::from_config(
            &cfg.audit,
            Arc::clone(&clock),
            Arc::clone(&metrics),
        )?);

        let sessions = Arc::new(SessionStore::new(
            cfg.sessions.ttl(),
            Arc::clone(&clock),
            Arc::clone(&audit),
        ));
        let lockout = Arc::new(LockoutTracker::new(
            cfg.lockout.threshold,
            cfg.lockout.duration(),
            Arc::clone(&clock),
            Arc::clone(&audit),
        ));
        let limiter = Arc::new(RateLimiter::new(
            &cfg.rate_limit,
            Arc::clone(&clock),
            Arc::clone(&audit),
        ));
        let access = Arc::new(AccessGuard::new(Arc::clone(&audit)));
        let codes = Arc::new(OneTimeCodes::new(
            cfg.mfa.code_ttl(),
            Arc::clone(&clock),
            Arc::clone(&audit),
        ));

        tracing::info!(
            session_ttl_secs = cfg.sessions.ttl_secs,
            lockout_threshold = cfg.lockout.threshold,
            lockout_secs = cfg.lockout.duration_secs,
            backends = ?cfg.audit.backends,
            "security core ready"
        );

        Ok(Self {
            inner: Arc::new(SecurityCoreInner {
                cfg,
                metrics,
                audit,
                sessions,
                lockout,
                limiter,
                access,
                codes,
            }),
        })
    }

    pub fn cfg(&self) -> &SecurityConfig {
        &self.inner.cfg
    }

    pub fn audit(&self) -> Arc<AuditSink> {
        Arc::clone(&self.inner.audit)
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.inner.sessions)
    }

    pub fn lockout(&self) -> Arc<LockoutTracker> {
        Arc::clone(&self.inner.lockout)
    }

    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.inner.limiter)
    }

    pub fn access(&self) -> Arc<AccessGuard> {
        Arc::clone(&self.inner.access)
    }

    pub fn codes(&self) -> Arc<OneTimeCodes> {
        Arc::clone(&self.inner.codes)
    }

    /// Login/authorize flow bound to a caller-supplied credential store.
    pub fn authenticator(&self, verifier: Arc<dyn CredentialVerifier>) -> Authenticator {
        Authenticator::new(
            self.sessions(),
            self.lockout(),
            self.rate_limiter(),
            self.access(),
            self.audit(),
            verifier,
        )
    }

    /// Drop lapsed sessions, stale rate windows and expired codes.
    /// Optional: every component also expires state lazily on access.
    pub fn purge_expired(&self) -> usize {
        let sessions = self.inner.sessions.purge_expired();
        let windows = self.inner.limiter.purge_stale();
        let codes = self.inner.codes.purge_expired();
        tracing::debug!(sessions, windows, codes, "expired security state purged");
        sessions + windows + codes
    }

    /// Prometheus text for all counters plus live-session gauge.
    pub fn metrics_text(&self) -> String {
        let live = u64::try_from(self.inner.sessions.len()).unwrap_or(u64::MAX);
        self.inner.metrics.render(&[("depotguard_sessions_live", live)])
    }

    /// Flush audit backends. Call once during shutdown.
    pub fn shutdown(&self) {
        self.inner.audit.close();
    }
}
