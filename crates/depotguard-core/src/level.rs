//! Classification / clearance lattice.
//!
//! Ordering is defined by the explicit `rank()` table below, never by the
//! declaration order of the variants.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// A totally ordered security level, used both as a subject clearance and as
/// an object classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    Unclassified,
    Confidential,
    Secret,
    TopSecret,
}

impl SecurityLevel {
    /// Every level, lowest rank first.
    pub const ALL: [SecurityLevel; 4] = [
        SecurityLevel::Unclassified,
        SecurityLevel::Confidential,
        SecurityLevel::Secret,
        SecurityLevel::TopSecret,
    ];

    /// Explicit integer rank (0..=3).
    pub const fn rank(self) -> u8 {
        match self {
            SecurityLevel::Unclassified => 0,
            SecurityLevel::Confidential => 1,
            SecurityLevel::Secret => 2,
            SecurityLevel::TopSecret => 3,
        }
    }

    /// Inverse of [`SecurityLevel::rank`].
    pub fn from_rank(rank: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.rank() == rank)
            .ok_or_else(|| GuardError::InvalidInput(format!("invalid clearance level: {rank}")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::Unclassified => "UNCLASSIFIED",
            SecurityLevel::Confidential => "CONFIDENTIAL",
            SecurityLevel::Secret => "SECRET",
            SecurityLevel::TopSecret => "TOP_SECRET",
        }
    }
}

impl Ord for SecurityLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for SecurityLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = GuardError;

    /// Case-insensitive; unknown names are rejected rather than mapped to a default.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GuardError::InvalidInput(format!("unknown security level: {wanted}")))
    }
}
