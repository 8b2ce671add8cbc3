//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

/// Configuration for tracing behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    /// Whether to enter a span while a stage processes an item.
    pub stage_spans: bool,
    /// Whether to emit a trace event per delivered or buffered item.
    pub item_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            stage_spans: true,
            item_events: false, // Can be expensive
        }
    }
}

impl TracingConfig {
    /// Enable everything.
    pub fn all() -> Self {
        Self {
            stage_spans: true,
            item_events: true,
        }
    }

    /// Disable all spans and per-item events.
    pub fn none() -> Self {
        Self {
            stage_spans: false,
            item_events: false,
        }
    }
}

/// Create a span for building a chain.
///
/// # Example
///
/// ```rust,ignore
/// use sluice::observability::span_chain;
///
/// let span = span_chain(3);
/// let _guard = span.enter();
/// // Wiring here...
/// ```
#[inline]
pub fn span_chain(stages: usize) -> Span {
    span!(Level::DEBUG, "chain", stages = stages)
}

/// Create a span for a stage hook.
#[inline]
pub fn span_stage(stage: &str, hook: &'static str) -> Span {
    span!(Level::TRACE, "stage", stage = %stage, hook = hook)
}

/// Enter a stage span if the config asks for one.
pub fn instrument_stage(
    config: &TracingConfig,
    stage: &str,
    hook: &'static str,
) -> Option<tracing::span::EnteredSpan> {
    config
        .stage_spans
        .then(|| span_stage(stage, hook).entered())
}

/// Log an item passed downstream.
#[inline]
pub fn trace_delivered(stage: &str) {
    tracing::trace!(stage = %stage, "item delivered");
}

/// Log an item parked in the pending buffer.
#[inline]
pub fn trace_buffered(stage: &str, depth: usize) {
    tracing::trace!(stage = %stage, depth = depth, "item buffered");
}

/// Log a flow-control change towards upstream.
#[inline]
pub fn trace_upstream(stage: &str, paused: bool) {
    tracing::debug!(stage = %stage, paused = paused, "upstream flow changed");
}

/// Log a stage failure.
#[inline]
pub fn trace_error(stage: &str, error: &dyn std::error::Error) {
    tracing::error!(stage = %stage, error = %error, "stage error");
}

/// Log end of flow.
#[inline]
pub fn trace_stopped(stage: &str, reason: &crate::flow::StopReason) {
    tracing::debug!(stage = %stage, reason = %reason, "flow stopped");
}
