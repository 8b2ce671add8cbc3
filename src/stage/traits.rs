//! Core stage traits.

use crate::caps::Caps;
use crate::error::Result;
use crate::flow::StopReason;

use super::link::StageLink;
use super::output::Output;

// ============================================================================
// Stage Trait
// ============================================================================

/// A unit of computation installed in a [`Coordinator`](crate::pipeline::Coordinator).
///
/// The coordinator hands every received item to [`received`](Stage::received)
/// and delivers whatever it returns downstream, in order. Every hook has a
/// default, so a stage only implements what it needs.
///
/// # Lifecycle
///
/// - `started()` is called once, when the coordinator is first attached to an
///   upstream producer
/// - `received()` is called for each item
/// - `progressed()` is called for every progress notification
/// - `stopped()` is called when upstream ends the flow
///
/// Returning `Err(...)` from any hook propagates to whoever fed the
/// coordinator; the coordinator does not retry or swallow failures.
///
/// # Example
///
/// ```rust
/// use sluice::prelude::*;
///
/// struct Upper;
///
/// impl Stage<String> for Upper {
///     fn received(&mut self, item: String) -> Result<Output<String>> {
///         Ok(Output::single(item.to_uppercase()))
///     }
/// }
/// ```
pub trait Stage<T>: 'static {
    /// Process one input item.
    fn received(&mut self, item: T) -> Result<Output<T>> {
        drop(item);
        Ok(Output::None)
    }

    /// Emit any items that should precede the first input.
    fn started(&mut self) -> Result<Output<T>> {
        Ok(Output::None)
    }

    /// Upstream has ended the flow; emit any final items.
    fn stopped(&mut self, reason: &StopReason) -> Result<Output<T>> {
        let _ = reason;
        Ok(Output::None)
    }

    /// Progress was reported without new data.
    ///
    /// `amount` is an opaque hint.
    fn progressed(&mut self, amount: Option<f64>) {
        let _ = amount;
    }

    /// Caps this stage accepts, if declared.
    fn input_caps(&self) -> Option<Caps> {
        None
    }

    /// Caps this stage produces, if declared.
    fn output_caps(&self) -> Option<Caps> {
        None
    }

    /// Link kept up to date with the coordinator owning this stage.
    fn link(&self) -> Option<&StageLink<T>> {
        None
    }

    /// Switching capability, if this stage supports it.
    ///
    /// Queried when the stage is installed. Switchable stages return
    /// `Some(self)`.
    fn switchable(&mut self) -> Option<&mut dyn Switchable<T>> {
        None
    }

    /// Get the name of this stage (for debugging/logging).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ============================================================================
// Switchable Trait
// ============================================================================

/// Stages that can hand their stream over to a different downstream chain.
///
/// When a switch happens, the coordinator collects every item the stage
/// produced but that never reached the old downstream, and passes them to
/// [`reassemble`](Switchable::reassemble). The returned items are replayed
/// into the new chain before any further input.
pub trait Switchable<T> {
    /// Rebuild the replay items from undelivered output.
    fn reassemble(&mut self, residual: Vec<T>) -> Result<Output<T>>;
}

impl<T: 'static> Stage<T> for Box<dyn Stage<T>> {
    fn received(&mut self, item: T) -> Result<Output<T>> {
        (**self).received(item)
    }

    fn started(&mut self) -> Result<Output<T>> {
        (**self).started()
    }

    fn stopped(&mut self, reason: &StopReason) -> Result<Output<T>> {
        (**self).stopped(reason)
    }

    fn progressed(&mut self, amount: Option<f64>) {
        (**self).progressed(amount)
    }

    fn input_caps(&self) -> Option<Caps> {
        (**self).input_caps()
    }

    fn output_caps(&self) -> Option<Caps> {
        (**self).output_caps()
    }

    fn link(&self) -> Option<&StageLink<T>> {
        (**self).link()
    }

    fn switchable(&mut self) -> Option<&mut dyn Switchable<T>> {
        (**self).switchable()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
