use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use depotguard_core::audit::AuditOutcome;
use depotguard_core::clock::{duration_ms, Clock};
use depotguard_core::error::{GuardError, Result};

use crate::audit::AuditSink;
use crate::config::RateLimitSection;

/// Window size; fixed by policy.
pub const WINDOW: Duration = Duration::from_secs(60);

const WINDOW_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateKey {
    identity: String,
    action: String,
}

impl RateKey {
    fn new(identity: &str, action: &str) -> Self {
        Self {
            identity: identity.to_string(),
            action: action.to_ascii_uppercase(),
        }
    }
}

/// Counter for one (identity, action) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub window_start_ms: u64,
    pub count: u32,
}

impl RateWindow {
    fn fresh(now_ms: u64) -> Self {
        Self { window_start_ms: now_ms, count: 1 }
    }

    fn is_current(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.window_start_ms) < WINDOW_MS
    }
}

/// Action-agnostic limiter: each caller passes its own bound.
pub struct RateLimiter {
    windows: DashMap<RateKey, RateWindow>,
    /// identity -> ban end (epoch ms). Kept apart from `windows` so no caller
    /// action name can alias a ban.
    bans: DashMap<String, u64>,
    default_limit: u32,
    action_limits: BTreeMap<String, u32>,
    clock: Arc<dyn Clock>,
    audit: Arc<AuditSink>,
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitSection, clock: Arc<dyn Clock>, audit: Arc<AuditSink>) -> Self {
        let action_limits = cfg
            .actions
            .iter()
            .map(|(k, v)| (k.trim().to_ascii_uppercase(), *v))
            .collect();
        Self {
            windows: DashMap::new(),
            bans: DashMap::new(),
            default_limit: cfg.default_limit,
            action_limits,
            clock,
            audit,
        }
    }

    /// Configured bound for `action` (falls back to the default limit).
    pub fn limit_for(&self, action: &str) -> u32 {
        self.action_limits
            .get(&action.to_ascii_uppercase())
            .copied()
            .unwrap_or(self.default_limit)
    }

    /// Count one request and decide.
    ///
    /// A denial is sticky: the increment is kept, so every later call in the
    /// same window is denied too.
    pub fn allow(&self, identity: &str, action: &str, max_per_window: u32) -> bool {
        let now = self.clock.now_ms();

        if self.is_banned_at(identity, now) {
            self.on_denied(identity, action, "identity temporarily banned");
            return false;
        }

        let count = {
            let mut w = self
                .windows
                .entry(RateKey::new(identity, action))
                .or_insert_with(|| RateWindow { window_start_ms: now, count: 0 });
            if w.count == 0 || !w.is_current(now) {
                *w = RateWindow::fresh(now);
                return true;
            }
            w.count = w.count.saturating_add(1);
            w.count
        };

        if count > max_per_window {
            self.on_denied(
                identity,
                action,
                &format!("{count} requests in window, max {max_per_window}"),
            );
            return false;
        }
        true
    }

    /// `allow` with the configured bound, as a `Result`.
    pub fn check(&self, identity: &str, action: &str) -> Result<()> {
        if self.allow(identity, action, self.limit_for(action)) {
            Ok(())
        } else {
            Err(GuardError::RateLimited)
        }
    }

    /// Remove every window (and any ban) recorded for `identity`.
    pub fn clear(&self, identity: &str) {
        self.windows.retain(|k, _| k.identity != identity);
        self.bans.remove(identity);
        self.audit.record(
            Some(identity),
            "RATE_LIMIT_CLEARED",
            AuditOutcome::Success,
            None,
            "rate limit counters cleared",
        );
    }

    /// Deny every action for `identity` until `duration` has passed.
    ///
    /// Recorded as state that lapses on its own; nothing runs in the background.
    pub fn ban(&self, identity: &str, duration: Duration) {
        let now = self.clock.now_ms();
        let until = now.saturating_add(duration_ms(duration));
        self.bans.insert(identity.to_string(), until);
        tracing::warn!(identity, secs = duration.as_secs(), "identity temporarily banned");
        self.audit.record(
            Some(identity),
            "TEMPORARY_BAN",
            AuditOutcome::Denied,
            None,
            format!("banned for {} seconds", duration.as_secs()),
        );
    }

    pub fn is_banned(&self, identity: &str) -> bool {
        self.is_banned_at(identity, self.clock.now_ms())
    }

    fn is_banned_at(&self, identity: &str, now: u64) -> bool {
        let active = match self.bans.get(identity) {
            None => return false,
            Some(until) => now < *until,
        };
        if !active {
            self.bans.remove_if(identity, |_, until| now >= *until);
        }
        active
    }

    /// End of the active ban, if any.
    pub fn banned_until(&self, identity: &str) -> Option<u64> {
        let now = self.clock.now_ms();
        self.bans.get(identity).map(|u| *u).filter(|until| now < *until)
    }

    /// Drop windows older than two window sizes and lapsed bans.
    pub fn purge_stale(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.windows.len() + self.bans.len();
        self.windows
            .retain(|_, w| now.saturating_sub(w.window_start_ms) < WINDOW_MS * 2);
        self.bans.retain(|_, until| now < *until);
        before.saturating_sub(self.windows.len() + self.bans.len())
    }

    /// Current window for a key, if any.
    pub fn window(&self, identity: &str, action: &str) -> Option<RateWindow> {
        self.windows.get(&RateKey::new(identity, action)).map(|w| *w)
    }

    fn on_denied(&self, identity: &str, action: &str, detail: &str) {
        let action = action.to_ascii_uppercase();
        self.audit
            .metrics()
            .rate_limit_denials
            .inc(&[("action", action.as_str())]);
        tracing::debug!(identity, action = %action, detail, "rate limited");
        self.audit.record(
            Some(identity),
            "RATE_LIMIT_EXCEEDED",
            AuditOutcome::Denied,
            None,
            format!("{action}: {detail}"),
        );
    }
}
