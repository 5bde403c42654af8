//! Top-level facade crate for depotguard.
//!
//! Re-exports the core primitives and the security engine so callers can depend on a single crate.

pub mod core {
    pub use depotguard_core::*;
}

pub mod engine {
    pub use depotguard_engine::*;
}
