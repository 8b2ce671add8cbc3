//! Upstream pause bookkeeping.

use crate::error::{Error, Result};

/// Records whether a coordinator currently holds a pause on its upstream.
///
/// The latch is engaged exactly when `pause_flow` has been sent upstream and
/// not yet matched by `resume_flow`. Engaging it twice is an invariant
/// breach, so callers check [`is_engaged`](PauseLatch::is_engaged) first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseLatch {
    engaged: bool,
    pauses: u64,
}

impl PauseLatch {
    /// Create a released latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a pause is outstanding.
    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Record that a pause was sent upstream.
    pub fn engage(&mut self) -> Result<()> {
        if self.engaged {
            return Err(Error::DoublePause);
        }
        self.engaged = true;
        self.pauses += 1;
        Ok(())
    }

    /// Record that the outstanding pause was resumed.
    ///
    /// Returns `false` if nothing was engaged (no resume should be sent).
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.engaged, false)
    }

    /// Forget the outstanding pause without resuming.
    ///
    /// Used when the paused producer is no longer our upstream.
    pub fn reset(&mut self) {
        self.engaged = false;
    }

    /// Total pauses engaged over the latch's lifetime.
    pub fn pauses(&self) -> u64 {
        self.pauses
    }
}
