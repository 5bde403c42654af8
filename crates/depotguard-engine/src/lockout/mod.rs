//! Per-identity login failure tracking and lockout.

mod tracker;

pub use tracker::{LockoutRecord, LockoutTracker};
