//! Security engine config loader (strict parsing).

pub mod schema;

use std::fs;

use depotguard_core::error::{GuardError, Result};

pub use schema::{
    AuditBackendKind, AuditSection, LockoutSection, MfaSection, RateLimitSection, SecurityConfig,
    SessionSection,
};

/// Environment variable overriding `sessions.ttl_secs`.
pub const SESSION_TTL_ENV: &str = "SESSION_TIMEOUT_SECONDS";

pub fn load_from_file(path: &str) -> Result<SecurityConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| GuardError::Internal(format!("read config failed: {e}")))?;
    let mut cfg = load_from_str(&s)?;
    cfg.apply_env(|k| std::env::var(k).ok())?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<SecurityConfig> {
    let cfg: SecurityConfig = serde_yaml::from_str(s)
        .map_err(|e| GuardError::InvalidInput(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
