//! Metrics collection using metrics-rs.

use metrics::{Counter, Gauge, Unit, counter, gauge};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const ITEMS_RECEIVED: &str = "sluice_items_received";
const ITEMS_DELIVERED: &str = "sluice_items_delivered";
const ITEMS_BUFFERED: &str = "sluice_items_buffered";
const UPSTREAM_PAUSES: &str = "sluice_upstream_pauses";
const SWITCHES: &str = "sluice_switches";
const PENDING_DEPTH: &str = "sluice_pending_depth";

/// Initialize metrics descriptions.
///
/// Call this once at application startup before using any metrics.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        ITEMS_RECEIVED,
        Unit::Count,
        "Total number of items handed to stages"
    );
    metrics::describe_counter!(
        ITEMS_DELIVERED,
        Unit::Count,
        "Total number of items passed to a downstream consumer"
    );
    metrics::describe_counter!(
        ITEMS_BUFFERED,
        Unit::Count,
        "Total number of items held while no downstream could take them"
    );
    metrics::describe_counter!(
        UPSTREAM_PAUSES,
        Unit::Count,
        "Total number of pauses sent to upstream producers"
    );
    metrics::describe_counter!(SWITCHES, Unit::Count, "Total number of completed switches");
    metrics::describe_gauge!(
        PENDING_DEPTH,
        Unit::Count,
        "Items currently waiting in a coordinator's pending buffer"
    );
}

/// Metrics handles for one coordinator.
///
/// Labels are fixed at creation so recording on the hot path is a counter
/// increment.
#[derive(Clone)]
pub struct StageMetrics {
    stage: String,
    received: Counter,
    delivered: Counter,
    buffered: Counter,
    pauses: Counter,
    switches: Counter,
    pending: Gauge,
}

impl StageMetrics {
    /// Create metrics handles labelled with a stage name.
    pub fn new(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            received: counter!(ITEMS_RECEIVED, "stage" => stage.to_string()),
            delivered: counter!(ITEMS_DELIVERED, "stage" => stage.to_string()),
            buffered: counter!(ITEMS_BUFFERED, "stage" => stage.to_string()),
            pauses: counter!(UPSTREAM_PAUSES, "stage" => stage.to_string()),
            switches: counter!(SWITCHES, "stage" => stage.to_string()),
            pending: gauge!(PENDING_DEPTH, "stage" => stage.to_string()),
        }
    }

    /// Record an item handed to the stage.
    #[inline]
    pub fn record_received(&self) {
        self.received.increment(1);
    }

    /// Record an item passed downstream.
    #[inline]
    pub fn record_delivered(&self) {
        self.delivered.increment(1);
    }

    /// Record an item entering the pending buffer.
    #[inline]
    pub fn record_buffered(&self, depth: usize) {
        self.buffered.increment(1);
        self.pending.set(depth as f64);
    }

    /// Record the pending buffer depth after a flush.
    #[inline]
    pub fn record_pending(&self, depth: usize) {
        self.pending.set(depth as f64);
    }

    /// Record a pause sent upstream.
    #[inline]
    pub fn record_pause(&self) {
        self.pauses.increment(1);
    }

    /// Record a completed switch.
    #[inline]
    pub fn record_switch(&self) {
        self.switches.increment(1);
    }

    /// Get the stage label.
    pub fn stage(&self) -> &str {
        &self.stage
    }
}
