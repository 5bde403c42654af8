//! depotguard security engine.
//!
//! Stateful half of the security core: sessions, lockout, rate limiting,
//! audit, access enforcement and one-time codes, wired together by
//! [`SecurityCore`]. Request handlers consult it before doing anything else.

pub mod access;
pub mod audit;
pub mod auth;
pub mod config;
pub mod core_state;
pub mod input;
pub mod lockout;
pub mod mfa;
pub mod obs;
pub mod ratelimit;
pub mod session;

pub use core_state::SecurityCore;
