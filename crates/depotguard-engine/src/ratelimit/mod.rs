//! Per-(identity, action) fixed-size windows and temporary bans.

mod limiter;

pub use limiter::{RateLimiter, RateWindow, WINDOW};
