//! Bell-LaPadula access policy.
//!
//! - Simple security property ("no read up"): read iff `subject >= object`.
//! - *-property ("no write down"): write iff `subject <= object`.
//!
//! These functions are pure and total. Audit emission on denial is the job of
//! the engine's `AccessGuard`, which wraps them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::level::SecurityLevel;

/// Kind of access requested against a classified object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Read => "READ",
            AccessMode::Write => "WRITE",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("READ") {
            Ok(AccessMode::Read)
        } else if s.eq_ignore_ascii_case("WRITE") {
            Ok(AccessMode::Write)
        } else {
            Err(GuardError::InvalidInput(format!(
                "invalid operation: {s} (must be READ or WRITE)"
            )))
        }
    }
}

/// No read up.
pub fn check_read_access(subject: SecurityLevel, object: SecurityLevel) -> bool {
    subject.rank() >= object.rank()
}

/// No write down.
pub fn check_write_access(subject: SecurityLevel, object: SecurityLevel) -> bool {
    subject.rank() <= object.rank()
}

pub fn check_access(subject: SecurityLevel, object: SecurityLevel, mode: AccessMode) -> bool {
    match mode {
        AccessMode::Read => check_read_access(subject, object),
        AccessMode::Write => check_write_access(subject, object),
    }
}

/// Classification of a business data category.
///
/// Unknown categories classify as `TopSecret` so an unmapped resource is never
/// readable by a lower clearance.
pub fn classify(data_type: &str) -> SecurityLevel {
    match data_type.trim().to_ascii_uppercase().as_str() {
        "PUBLIC_INFO" | "MARKETING" => SecurityLevel::Unclassified,
        "PACKAGE_INFO" | "ROUTE_INFO" | "TRACKING" => SecurityLevel::Confidential,
        "USER_PII" | "PAYMENT_INFO" | "FACILITY_INVENTORY" => SecurityLevel::Secret,
        "OPTIMIZATION_ALGORITHM" | "SYSTEM_LOGS" | "AUDIT_LOGS" => SecurityLevel::TopSecret,
        _ => SecurityLevel::TopSecret,
    }
}
