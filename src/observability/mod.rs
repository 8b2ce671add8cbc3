//! Observability features: metrics and tracing.
//!
//! - **Metrics**: Counters and gauges via `metrics-rs`
//! - **Tracing**: Structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `sluice_items_received` | Counter | Items handed to stages |
//! | `sluice_items_delivered` | Counter | Items passed downstream |
//! | `sluice_items_buffered` | Counter | Items held in a pending buffer |
//! | `sluice_upstream_pauses` | Counter | Pauses sent upstream |
//! | `sluice_switches` | Counter | Completed switches |
//! | `sluice_pending_depth` | Gauge | Current pending buffer depth |
//!
//! Every metric carries a `stage` label. Without an installed recorder,
//! recording is a no-op.
//!
//! ## Tracing
//!
//! Coordinators log attachment, pausing and switching at `debug`, and
//! per-item events at `trace` when [`TracingConfig::item_events`] is set.

mod metrics;
mod tracing_support;

pub use metrics::{StageMetrics, init_metrics};
pub use tracing_support::{
    TracingConfig, instrument_stage, span_chain, span_stage, trace_buffered, trace_delivered,
    trace_error, trace_stopped, trace_upstream,
};
