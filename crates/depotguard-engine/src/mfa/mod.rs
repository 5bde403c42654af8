//! Single-use numeric codes for a second authentication factor.
//!
//! Delivery (email/SMS) is up to the caller; this module only issues, stores
//! and consumes codes.

mod codes;

pub use codes::{OneTimeCodes, CODE_LEN};
