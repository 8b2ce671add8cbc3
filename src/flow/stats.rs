//! Per-coordinator flow statistics.

/// Statistics about a coordinator's flow behavior.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStats {
    /// Items handed to the stage.
    pub items_received: u64,
    /// Items passed to a downstream consumer.
    pub items_delivered: u64,
    /// Items that had to wait in the pending buffer.
    pub items_buffered: u64,
    /// Largest pending buffer seen.
    pub max_pending: usize,
    /// Pauses sent upstream.
    pub upstream_pauses: u64,
    /// Resumes sent upstream.
    pub upstream_resumes: u64,
    /// Progress notifications forwarded downstream.
    pub progress_forwarded: u64,
    /// Completed switches.
    pub switches: u64,
}

impl FlowStats {
    /// Record an item handed to the stage.
    pub fn record_received(&mut self) {
        self.items_received += 1;
    }

    /// Record an item passed downstream.
    pub fn record_delivered(&mut self) {
        self.items_delivered += 1;
    }

    /// Record an item entering the pending buffer at the given depth.
    pub fn record_buffered(&mut self, depth: usize) {
        self.items_buffered += 1;
        if depth > self.max_pending {
            self.max_pending = depth;
        }
    }

    /// Fraction of delivered items that were buffered first, as a percentage.
    pub fn buffered_rate(&self) -> f64 {
        if self.items_delivered == 0 {
            0.0
        } else {
            (self.items_buffered as f64 / self.items_delivered as f64) * 100.0
        }
    }
}
