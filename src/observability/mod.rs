//! Observability subsystem.
//!
//! Structured logs go through `tracing` (logging.rs); counters and the
//! queue-depth gauge go through the `metrics` facade with a Prometheus
//! exporter (metrics.rs). Dropped items are never silent: every terminal
//! drop is both logged and counted.

pub mod logging;
pub mod metrics;
