//! Coordinator configuration.

use crate::observability::TracingConfig;

/// Configuration for a [`Coordinator`](super::Coordinator).
///
/// # Example
///
/// ```rust
/// use sluice::pipeline::CoordinatorConfig;
///
/// let config = CoordinatorConfig::default()
///     .with_name("splitter")
///     .with_pending_warning(1024);
/// assert_eq!(config.name.as_deref(), Some("splitter"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Name used in logs and metric labels instead of the stage's own name.
    pub name: Option<String>,
    /// Log a warning each time the pending buffer grows past a multiple of
    /// this depth. The buffer itself is never capped.
    pub pending_warning: Option<usize>,
    /// Tracing behavior.
    pub tracing: TracingConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: None,
            pending_warning: Some(DEFAULT_PENDING_WARNING),
            tracing: TracingConfig::default(),
        }
    }
}

/// Default depth at which a growing pending buffer is reported.
pub const DEFAULT_PENDING_WARNING: usize = 4096;

impl CoordinatorConfig {
    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the pending buffer warning depth.
    pub fn with_pending_warning(mut self, depth: usize) -> Self {
        self.pending_warning = Some(depth);
        self
    }

    /// Never warn about the pending buffer.
    pub fn without_pending_warning(mut self) -> Self {
        self.pending_warning = None;
        self
    }

    /// Set the tracing config.
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Check if a buffer that just reached `depth` should be reported.
    pub(crate) fn should_warn(&self, depth: usize) -> bool {
        match self.pending_warning {
            Some(0) | None => false,
            Some(level) => depth % level == 0,
        }
    }
}
