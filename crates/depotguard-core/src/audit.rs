//! Audit record and its durable line format.
//!
//! Line format (one entry per line, order-preserving per writer):
//! `timestamp | actor | action | outcome | source | detail`
//!
//! Absent actor/source render as `-`. Field text never contains the `|`
//! separator or a raw line break.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Result of the decision being recorded. Always supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Denied,
    Error,
}

impl AuditOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Denied => "denied",
            AuditOutcome::Error => "error",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: Option<String>,
    pub action: String,
    pub outcome: AuditOutcome,
    pub source: Option<String>,
    pub detail: String,
}

impl AuditEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        actor: Option<&str>,
        action: &str,
        outcome: AuditOutcome,
        source: Option<&str>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            actor: actor.map(str::to_string),
            action: action.to_string(),
            outcome,
            source: source.map(str::to_string),
            detail: detail.into(),
        }
    }

    /// Render the durable line (without trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {} | {} | {} | {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            field(self.actor.as_deref()),
            field(Some(&self.action)),
            self.outcome.as_str(),
            field(self.source.as_deref()),
            escape(&self.detail),
        )
    }
}

fn field(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => escape(s),
        _ => "-".to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('|', "/").replace('\r', "\\r").replace('\n', "\\n")
}
