//! depotguard core: runtime-free security primitives shared by the engine.
//!
//! This crate defines the classification lattice, the Bell-LaPadula decision
//! functions, the audit record format, the clock abstraction and the error
//! surface. It carries no concurrency or I/O machinery so the same decisions
//! can be evaluated anywhere (engine, tooling, tests).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `GuardError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod access;
pub mod audit;
pub mod clock;
pub mod error;
pub mod level;

/// Shared result type.
pub use error::{AuthFailure, GuardError, Result};
pub use level::SecurityLevel;
