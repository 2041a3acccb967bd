//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics keyed by sorted label sets and rendered in
//! Prometheus text format on demand (the binary logs them at shutdown).

pub mod metrics;

pub use metrics::{CounterVec, SessionMetrics};
