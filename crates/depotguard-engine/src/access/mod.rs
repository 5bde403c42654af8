//! Mandatory access control enforcement.
//!
//! Wraps the pure Bell-LaPadula checks from `depotguard_core::access` with
//! audit emission on denial.

mod guard;

pub use guard::AccessGuard;
