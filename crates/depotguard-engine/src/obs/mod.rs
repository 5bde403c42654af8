//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics in `DashMap`s and rendered in Prometheus
//! text format by `SecurityCore::metrics_text`.

pub mod metrics;

pub use metrics::SecurityMetrics;
