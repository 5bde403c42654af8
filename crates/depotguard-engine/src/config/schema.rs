use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use depotguard_core::error::{GuardError, Result};

use super::SESSION_TTL_ENV;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    pub version: u32,

    #[serde(default)]
    pub sessions: SessionSection,

    #[serde(default)]
    pub lockout: LockoutSection,

    #[serde(default)]
    pub rate_limit: RateLimitSection,

    #[serde(default)]
    pub mfa: MfaSection,

    #[serde(default)]
    pub audit: AuditSection,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            version: 1,
            sessions: SessionSection::default(),
            lockout: LockoutSection::default(),
            rate_limit: RateLimitSection::default(),
            mfa: MfaSection::default(),
            audit: AuditSection::default(),
        }
    }
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GuardError::InvalidInput(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.sessions.validate()?;
        self.lockout.validate()?;
        self.rate_limit.validate()?;
        self.mfa.validate()?;
        self.audit.validate()?;

        Ok(())
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SESSION_TTL_ENV) {
            let ttl: u64 = raw.trim().parse().map_err(|_| {
                GuardError::InvalidInput(format!("{SESSION_TTL_ENV} must be an integer, got {raw:?}"))
            })?;
            self.sessions.ttl_secs = ttl;
            self.sessions.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self { ttl_secs: default_session_ttl_secs() }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.ttl_secs) {
            return Err(GuardError::InvalidInput(
                "sessions.ttl_secs must be between 1 and 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockoutSection {
    #[serde(default = "default_lockout_threshold")]
    pub threshold: u32,

    #[serde(default = "default_lockout_duration_secs")]
    pub duration_secs: u64,
}

impl Default for LockoutSection {
    fn default() -> Self {
        Self {
            threshold: default_lockout_threshold(),
            duration_secs: default_lockout_duration_secs(),
        }
    }
}

impl LockoutSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.threshold) {
            return Err(GuardError::InvalidInput(
                "lockout.threshold must be between 1 and 100".into(),
            ));
        }
        if !(1..=86_400).contains(&self.duration_secs) {
            return Err(GuardError::InvalidInput(
                "lockout.duration_secs must be between 1 and 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    /// Bound for actions without an explicit entry.
    #[serde(default = "default_rate_limit")]
    pub default_limit: u32,

    /// Per-action bounds, keyed by upper-case action name.
    #[serde(default = "default_action_limits")]
    pub actions: BTreeMap<String, u32>,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            default_limit: default_rate_limit(),
            actions: default_action_limits(),
        }
    }
}

impl RateLimitSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(GuardError::InvalidInput(
                "rate_limit.default_limit must be at least 1".into(),
            ));
        }
        for (action, limit) in &self.actions {
            if action.trim().is_empty() {
                return Err(GuardError::InvalidInput(
                    "rate_limit.actions keys must not be empty".into(),
                ));
            }
            if *limit == 0 {
                return Err(GuardError::InvalidInput(format!(
                    "rate_limit.actions.{action} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MfaSection {
    #[serde(default = "default_code_ttl_secs")]
    pub code_ttl_secs: u64,
}

impl Default for MfaSection {
    fn default() -> Self {
        Self { code_ttl_secs: default_code_ttl_secs() }
    }
}

impl MfaSection {
    pub fn validate(&self) -> Result<()> {
        if !(30..=3_600).contains(&self.code_ttl_secs) {
            return Err(GuardError::InvalidInput(
                "mfa.code_ttl_secs must be between 30 and 3600".into(),
            ));
        }
        Ok(())
    }

    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_secs)
    }
}

/// Selectable audit backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBackendKind {
    Memory,
    File,
    Tracing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSection {
    #[serde(default = "default_audit_backends")]
    pub backends: Vec<AuditBackendKind>,

    /// Required when `file` is listed.
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            backends: default_audit_backends(),
            file_path: None,
            queue_capacity: default_queue_capacity(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl AuditSection {
    pub fn validate(&self) -> Result<()> {
        if self.backends.contains(&AuditBackendKind::File)
            && self.file_path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(GuardError::InvalidInput(
                "audit.file_path is required when the file backend is enabled".into(),
            ));
        }
        if !(1..=1_048_576).contains(&self.queue_capacity) {
            return Err(GuardError::InvalidInput(
                "audit.queue_capacity must be between 1 and 1048576".into(),
            ));
        }
        if self.memory_capacity == 0 {
            return Err(GuardError::InvalidInput(
                "audit.memory_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_session_ttl_secs() -> u64 {
    3600
}
fn default_lockout_threshold() -> u32 {
    3
}
fn default_lockout_duration_secs() -> u64 {
    1800
}
fn default_rate_limit() -> u32 {
    2
}
fn default_action_limits() -> BTreeMap<String, u32> {
    BTreeMap::from([("LOGIN".to_string(), 5)])
}
fn default_code_ttl_secs() -> u64 {
    300
}
fn default_audit_backends() -> Vec<AuditBackendKind> {
    vec![AuditBackendKind::Memory, AuditBackendKind::Tracing]
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_memory_capacity() -> usize {
    10_000
}
