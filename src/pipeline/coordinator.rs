//! The coordinator: owns one stage and mediates all flow through it.
//!
//! # Design
//!
//! A coordinator sits between an upstream producer and a downstream
//! consumer:
//!
//! ```text
//!              ┌──────────────── Coordinator ────────────────┐
//! upstream ──> │ CoordinatorConsumer ─> Stage ─> deliver ─┬─> │ ──> downstream
//!     ^        │                                  pending ┘   │       │
//!     └─pause──│──────────── CoordinatorProducer <─── pause ──│───────┘
//!              └─────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on the caller's stack. Any call may re-enter the same
//! coordinator (a downstream attaching elsewhere, a stage requesting a
//! switch), so state lives in a `RefCell` that is never borrowed across a
//! call into another component, and every decision re-reads it after such
//! a call.
//!
//! Ownership runs downstream: a coordinator holds its downstream consumer
//! strongly and its upstream producer weakly, so the head of a chain keeps
//! the whole chain alive without reference cycles.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::caps::{self, Caps};
use crate::error::{Error, Result};
use crate::flow::{ConsumerRef, FlowStats, PauseLatch, ProducerRef, StopReason};
use crate::observability::{
    StageMetrics, instrument_stage, trace_buffered, trace_delivered, trace_error, trace_stopped,
    trace_upstream,
};
use crate::stage::{Output, Stage};

use super::config::CoordinatorConfig;
use super::endpoint::{CoordinatorConsumer, CoordinatorProducer};
use super::switch::Switcher;

// ============================================================================
// Coordinator Handle
// ============================================================================

/// Owns a [`Stage`] and exposes it to neighbours as a consumer (upstream
/// facing) and a producer (downstream facing).
///
/// `Coordinator` is a cheap handle; clones refer to the same coordinator.
///
/// # Example
///
/// ```rust
/// use sluice::prelude::*;
/// use sluice::testing::{CollectingConsumer, FakeProducer};
///
/// struct Double;
///
/// impl Stage<u32> for Double {
///     fn received(&mut self, item: u32) -> Result<Output<u32>> {
///         Ok(Output::single(item * 2))
///     }
/// }
///
/// let coordinator = Coordinator::new(Double);
/// let source = FakeProducer::<u32>::new();
/// let sink = CollectingConsumer::<u32>::new();
///
/// let next = source.flow_to(Some(coordinator.consumer()))?;
/// next.unwrap().flow_to(Some(sink.clone()))?;
///
/// source.emit(21)?;
/// assert_eq!(sink.received(), vec![42]);
/// # Ok::<(), sluice::Error>(())
/// ```
pub struct Coordinator<T: 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: 'static> Coordinator<T> {
    /// Create a coordinator owning `stage`.
    pub fn new<S: Stage<T>>(stage: S) -> Self {
        Self::with_config(stage, CoordinatorConfig::default())
    }

    /// Create a coordinator with an explicit config.
    pub fn with_config<S: Stage<T>>(stage: S, config: CoordinatorConfig) -> Self {
        Self {
            inner: Inner::new(Box::new(stage), config),
        }
    }

    pub(crate) fn from_inner(inner: Rc<Inner<T>>) -> Self {
        Self { inner }
    }

    /// The upstream-facing endpoint.
    ///
    /// The returned handle keeps the coordinator alive.
    pub fn consumer(&self) -> ConsumerRef<T> {
        Rc::new(CoordinatorConsumer::new(Rc::clone(&self.inner)))
    }

    /// The downstream-facing endpoint.
    pub fn producer(&self) -> ProducerRef<T> {
        self.inner.producer_ref()
    }

    /// Emit an item from this coordinator as if the stage had produced it.
    ///
    /// Buffers the item (pausing upstream once) when no downstream is
    /// attached.
    pub fn deliver(&self, item: T) -> Result<()> {
        self.inner.deliver(item)
    }

    /// Report progress as if upstream had.
    pub fn progress(&self, amount: Option<f64>) -> Result<()> {
        self.inner.progress(amount)
    }

    /// Replace the owned stage, returning the previous one.
    ///
    /// Endpoints and attachments are kept. The previous stage's link is
    /// cleared before the new stage's link is set. Fails with
    /// [`Error::StageBusy`] if called from inside one of the current
    /// stage's own hooks.
    pub fn set_stage<S: Stage<T>>(&self, stage: S) -> Result<Box<dyn Stage<T>>> {
        self.inner.install(Box::new(stage))
    }

    /// Check if the installed stage supports switching.
    pub fn is_switchable(&self) -> bool {
        let state = self.inner.state.borrow();
        state.switchable && !state.switched
    }

    /// The switch-initiation surface, present only for switchable stages.
    pub fn switcher(&self) -> Option<Switcher<T>> {
        self.is_switchable()
            .then(|| Switcher::new(Rc::downgrade(&self.inner)))
    }

    /// Hand the stream over to `consumer`.
    ///
    /// See [`Switcher::switch`].
    pub fn switch(&self, consumer: ConsumerRef<T>) -> Result<()> {
        self.inner.switch(consumer)
    }

    /// Check if this coordinator has switched and now passes items through.
    pub fn is_switched(&self) -> bool {
        self.inner.state.borrow().switched
    }

    /// The attached upstream producer, if it is still alive.
    pub fn upstream(&self) -> Option<ProducerRef<T>> {
        self.inner.upstream()
    }

    /// The attached downstream consumer.
    pub fn downstream(&self) -> Option<ConsumerRef<T>> {
        self.inner.state.borrow().downstream.clone()
    }

    /// Check if `consumer` is the attached downstream.
    pub fn is_flowing_to(&self, consumer: &ConsumerRef<T>) -> bool {
        self.inner
            .state
            .borrow()
            .downstream
            .as_ref()
            .is_some_and(|d| Rc::ptr_eq(d, consumer))
    }

    /// Number of items waiting for a downstream.
    pub fn pending_len(&self) -> usize {
        self.inner.state.borrow().pending.len()
    }

    /// Check if this coordinator holds a pause on its upstream.
    pub fn is_upstream_paused(&self) -> bool {
        self.inner.state.borrow().latch.is_engaged()
    }

    /// Check if the downstream has paused this coordinator.
    pub fn is_paused_by_downstream(&self) -> bool {
        self.inner.state.borrow().paused_by_downstream
    }

    /// Snapshot of flow statistics.
    pub fn stats(&self) -> FlowStats {
        self.inner.state.borrow().stats.clone()
    }

    /// Name used in logs (config name, else the stage's name).
    pub fn name(&self) -> Rc<str> {
        self.inner.label()
    }

    /// Check if two handles refer to the same coordinator.
    pub fn ptr_eq(&self, other: &Coordinator<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for Coordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinator for {}", self.inner.label())
    }
}

// ============================================================================
// Shared State
// ============================================================================

pub(crate) struct Inner<T: 'static> {
    stage: RefCell<Box<dyn Stage<T>>>,
    pub(super) state: RefCell<State<T>>,
    producer: Rc<CoordinatorProducer<T>>,
    label: RefCell<Rc<str>>,
    config: CoordinatorConfig,
    metrics: StageMetrics,
}

pub(super) struct State<T: 'static> {
    upstream: Option<Weak<dyn crate::flow::Producer<T>>>,
    pub(super) downstream: Option<ConsumerRef<T>>,
    /// Items waiting for a downstream, FIFO.
    pub(super) pending: VecDeque<T>,
    /// Stage output not yet handed to `deliver`.
    pub(super) in_flight: VecDeque<T>,
    pub(super) latch: PauseLatch,
    pub(super) paused_by_downstream: bool,
    flushing: bool,
    started: bool,
    stopped: Option<StopReason>,
    stop_forwarded: bool,
    pub(super) input_caps: Option<Caps>,
    pub(super) output_caps: Option<Caps>,
    pub(super) switchable: bool,
    pub(super) switched: bool,
    /// Bumped by every switch; delivery loops started under an older epoch stop.
    pub(super) epoch: u64,
    /// Switch requested while the stage was running one of its hooks.
    pub(super) deferred_switch: Option<ConsumerRef<T>>,
    pub(super) stats: FlowStats,
}

impl<T: 'static> State<T> {
    fn new() -> Self {
        Self {
            upstream: None,
            downstream: None,
            pending: VecDeque::new(),
            in_flight: VecDeque::new(),
            latch: PauseLatch::new(),
            paused_by_downstream: false,
            flushing: false,
            started: false,
            stopped: None,
            stop_forwarded: false,
            input_caps: None,
            output_caps: None,
            switchable: false,
            switched: false,
            epoch: 0,
            deferred_switch: None,
            stats: FlowStats::default(),
        }
    }

    /// Whether upstream should currently be held paused.
    fn wants_upstream_paused(&self) -> bool {
        if self.paused_by_downstream {
            return true;
        }
        if self.pending.is_empty() {
            return false;
        }
        // With a downstream, a non-empty buffer is being flushed: keep
        // whatever pause is outstanding until it drains.
        self.downstream.is_none() || self.latch.is_engaged()
    }
}

enum UpstreamAction<T: 'static> {
    Pause(ProducerRef<T>),
    Resume(ProducerRef<T>),
}

impl<T: 'static> Inner<T> {
    fn new(mut stage: Box<dyn Stage<T>>, config: CoordinatorConfig) -> Rc<Self> {
        let label: Rc<str> = config
            .name
            .clone()
            .unwrap_or_else(|| stage.name().to_string())
            .into();
        let metrics = StageMetrics::new(&label);

        let mut state = State::new();
        state.switchable = stage.switchable().is_some();
        state.input_caps = stage.input_caps();
        state.output_caps = stage.output_caps();

        let inner = Rc::new_cyclic(|this: &Weak<Inner<T>>| Inner {
            stage: RefCell::new(stage),
            state: RefCell::new(state),
            producer: Rc::new(CoordinatorProducer::new(this.clone())),
            label: RefCell::new(label),
            config,
            metrics,
        });

        if let Some(link) = inner.stage.borrow().link() {
            link.attach(Rc::downgrade(&inner));
        }
        tracing::debug!(stage = %inner.label(), "coordinator created");
        inner
    }

    pub(super) fn label(&self) -> Rc<str> {
        Rc::clone(&self.label.borrow())
    }

    pub(super) fn producer_ref(&self) -> ProducerRef<T> {
        Rc::clone(&self.producer) as ProducerRef<T>
    }

    pub(super) fn upstream(&self) -> Option<ProducerRef<T>> {
        self.state.borrow().upstream.as_ref().and_then(Weak::upgrade)
    }

    fn install(self: &Rc<Self>, mut stage: Box<dyn Stage<T>>) -> Result<Box<dyn Stage<T>>> {
        let mut slot = self
            .stage
            .try_borrow_mut()
            .map_err(|_| Error::StageBusy(self.label().to_string()))?;

        let switchable = stage.switchable().is_some();
        let input_caps = stage.input_caps();
        let output_caps = stage.output_caps();
        let name = stage.name().to_string();

        let previous = std::mem::replace(&mut *slot, stage);
        if let Some(link) = previous.link() {
            link.detach();
        }
        if let Some(link) = slot.link() {
            link.attach(Rc::downgrade(self));
        }
        drop(slot);

        {
            let mut state = self.state.borrow_mut();
            state.switchable = switchable;
            state.switched = false;
            state.input_caps = input_caps;
            state.output_caps = output_caps;
        }
        if self.config.name.is_none() {
            *self.label.borrow_mut() = name.into();
        }
        tracing::debug!(
            stage = %self.label(),
            previous = %previous.name(),
            switchable = switchable,
            "stage replaced"
        );
        Ok(previous)
    }

    /// Run one stage hook with the stage borrowed.
    pub(super) fn call_stage<R>(
        &self,
        hook: &'static str,
        f: impl FnOnce(&mut dyn Stage<T>) -> Result<R>,
    ) -> Result<R> {
        let label = self.label();
        let mut stage = self
            .stage
            .try_borrow_mut()
            .map_err(|_| Error::StageBusy(label.to_string()))?;
        let _span = instrument_stage(&self.config.tracing, &label, hook);
        let result = f(&mut **stage);
        if let Err(err) = &result {
            trace_error(&label, err);
        }
        result
    }

    /// Run a hook that may switch this coordinator from inside.
    ///
    /// If the hook fails after asking for a switch, the switch still goes
    /// through, with nothing from the failed hook in the residual.
    fn call_hook(
        self: &Rc<Self>,
        hook: &'static str,
        f: impl FnOnce(&mut dyn Stage<T>) -> Result<Output<T>>,
    ) -> Result<Output<T>> {
        let result = self.call_stage(hook, f);
        if result.is_err() {
            let deferred = self.state.borrow_mut().deferred_switch.take();
            if let Some(target) = deferred {
                if let Err(err) = self.complete_switch(target, Output::None) {
                    tracing::error!(
                        stage = %self.label(),
                        error = %err,
                        "switch after failed hook did not complete"
                    );
                }
            }
        }
        result
    }

    pub(super) fn stage_is_busy(&self) -> bool {
        self.stage.try_borrow_mut().is_err()
    }

    // ------------------------------------------------------------------------
    // Consumer side
    // ------------------------------------------------------------------------

    pub(super) fn flowing_from(
        self: &Rc<Self>,
        producer: Option<ProducerRef<T>>,
    ) -> Result<Option<ProducerRef<T>>> {
        if let Some(producer) = &producer {
            let accepted = {
                let state = self.state.borrow();
                if state.switched {
                    None
                } else {
                    state.input_caps.clone()
                }
            };
            caps::check(producer.output_caps(), accepted)?;
        }

        let start = {
            let mut state = self.state.borrow_mut();
            let same = match (state.upstream.as_ref().and_then(Weak::upgrade), &producer) {
                (Some(current), Some(producer)) => Rc::ptr_eq(&current, producer),
                _ => false,
            };
            state.upstream = producer.as_ref().map(Rc::downgrade);
            // A pause held on the previous upstream does not carry over
            if !same {
                state.latch.reset();
            }
            let start = producer.is_some() && !state.started && !state.switched;
            if start {
                state.started = true;
            }
            start
        };
        tracing::debug!(
            stage = %self.label(),
            upstream = ?producer,
            "upstream changed"
        );

        self.sync_upstream();

        if start {
            let outputs = self.call_hook("started", |stage| stage.started())?;
            self.deliver_all(outputs)?;
        }

        // Re-announce ourselves downstream so the caller gets the chain's tail
        let downstream = self.state.borrow().downstream.clone();
        match downstream {
            Some(consumer) => consumer.flowing_from(Some(self.producer_ref())),
            None => Ok(Some(self.producer_ref())),
        }
    }

    pub(super) fn receive(self: &Rc<Self>, item: T) -> Result<()> {
        let (switched, stopped) = {
            let state = self.state.borrow();
            (state.switched, state.stopped.is_some())
        };
        if stopped {
            tracing::warn!(stage = %self.label(), "item received after flow stopped, ignoring");
            return Ok(());
        }
        if switched {
            return self.deliver(item);
        }

        self.state.borrow_mut().stats.record_received();
        self.metrics.record_received();

        let outputs = self.call_hook("received", |stage| stage.received(item))?;
        let emitted = self.deliver_all(outputs)?;

        // Output already tells downstream that input was consumed
        if emitted == 0 {
            self.forward_progress(None)?;
        }
        Ok(())
    }

    pub(super) fn progress(self: &Rc<Self>, amount: Option<f64>) -> Result<()> {
        if !self.state.borrow().switched {
            self.call_hook("progressed", |stage| {
                stage.progressed(amount);
                Ok(Output::None)
            })?;
            // Completes a switch the hook asked for
            self.deliver_all(Output::None)?;
        }
        self.forward_progress(amount)
    }

    fn forward_progress(&self, amount: Option<f64>) -> Result<()> {
        let downstream = {
            let mut state = self.state.borrow_mut();
            let downstream = state.downstream.clone();
            if downstream.is_some() {
                state.stats.progress_forwarded += 1;
            }
            downstream
        };
        match downstream {
            Some(consumer) => consumer.progress(amount),
            None => Ok(()),
        }
    }

    pub(super) fn flow_stopped(self: &Rc<Self>, reason: StopReason) -> Result<()> {
        let switched = {
            let mut state = self.state.borrow_mut();
            if state.stopped.is_some() {
                drop(state);
                tracing::warn!(stage = %self.label(), "flow stopped twice, ignoring");
                return Ok(());
            }
            state.stopped = Some(reason.clone());
            state.switched
        };
        trace_stopped(&self.label(), &reason);

        if !switched {
            let outputs = self.call_hook("stopped", |stage| stage.stopped(&reason))?;
            self.deliver_all(outputs)?;
        }
        self.forward_stop()
    }

    /// Forward a recorded stop once everything ahead of it has gone out.
    fn forward_stop(&self) -> Result<()> {
        let target = {
            let mut state = self.state.borrow_mut();
            if state.stop_forwarded || !state.pending.is_empty() {
                None
            } else {
                let target = match (&state.stopped, &state.downstream) {
                    (Some(reason), Some(consumer)) => Some((Rc::clone(consumer), reason.clone())),
                    _ => None,
                };
                state.stop_forwarded = target.is_some();
                target
            }
        };
        match target {
            Some((consumer, reason)) => consumer.flow_stopped(reason),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Producer side
    // ------------------------------------------------------------------------

    pub(super) fn flow_to(
        self: &Rc<Self>,
        consumer: Option<ConsumerRef<T>>,
    ) -> Result<Option<ProducerRef<T>>> {
        if let Some(consumer) = &consumer {
            let produced = self.state.borrow().output_caps.clone();
            caps::check(produced, consumer.input_caps())?;
        }

        let (previous, previous_paused) = {
            let mut state = self.state.borrow_mut();
            let previous = std::mem::replace(&mut state.downstream, consumer.clone());
            let previous_paused = state.paused_by_downstream;
            // A pause belongs to the downstream that issued it
            if previous.is_some() {
                state.paused_by_downstream = false;
            }
            (previous, previous_paused)
        };
        tracing::debug!(
            stage = %self.label(),
            downstream = ?consumer,
            "downstream changed"
        );

        let next = match &consumer {
            Some(consumer) => consumer.flowing_from(Some(self.producer_ref())),
            None => Ok(None),
        };
        let next = match next {
            Ok(next) => next,
            Err(err) => {
                let mut state = self.state.borrow_mut();
                // Only roll back if nothing re-attached in the meantime
                if same_consumer(&state.downstream, &consumer) {
                    state.downstream = previous;
                    state.paused_by_downstream = previous_paused;
                }
                return Err(err);
            }
        };

        self.flush()?;
        self.sync_upstream();
        self.forward_stop()?;
        Ok(next)
    }

    pub(super) fn deliver(self: &Rc<Self>, item: T) -> Result<()> {
        let direct = {
            let state = self.state.borrow();
            if state.pending.is_empty() && !state.flushing {
                state.downstream.clone()
            } else {
                None
            }
        };

        if let Some(consumer) = direct {
            self.record_delivered();
            return consumer.receive(item);
        }

        let (depth, resume_flush) = {
            let mut state = self.state.borrow_mut();
            state.pending.push_back(item);
            let depth = state.pending.len();
            state.stats.record_buffered(depth);
            let resume_flush =
                state.downstream.is_some() && !state.flushing && !state.paused_by_downstream;
            (depth, resume_flush)
        };
        self.metrics.record_buffered(depth);
        let label = self.label();
        if self.config.tracing.item_events {
            trace_buffered(&label, depth);
        }
        if self.config.should_warn(depth) {
            tracing::warn!(stage = %label, depth = depth, "pending buffer is growing");
        }

        if resume_flush {
            self.flush()?;
        }
        self.sync_upstream();
        Ok(())
    }

    /// Deliver stage output in order, stopping if a switch intervenes.
    ///
    /// Returns how many items the stage produced.
    pub(super) fn deliver_all(self: &Rc<Self>, outputs: Output<T>) -> Result<usize> {
        let produced = outputs.len();

        let deferred = self.state.borrow_mut().deferred_switch.take();
        if let Some(target) = deferred {
            self.complete_switch(target, outputs)?;
            return Ok(produced);
        }

        let epoch = {
            let mut state = self.state.borrow_mut();
            state.in_flight.extend(outputs);
            state.epoch
        };
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                if state.epoch != epoch {
                    break;
                }
                state.in_flight.pop_front()
            };
            let Some(item) = next else {
                break;
            };
            if let Err(err) = self.deliver(item) {
                self.state.borrow_mut().in_flight.clear();
                return Err(err);
            }
        }
        Ok(produced)
    }

    /// Unbuffer pending items until empty or the downstream pauses.
    fn flush(self: &Rc<Self>) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.flushing || state.pending.is_empty() {
                return Ok(());
            }
            state.flushing = true;
        }
        let result = self.drain_pending();
        let depth = {
            let mut state = self.state.borrow_mut();
            state.flushing = false;
            state.pending.len()
        };
        self.metrics.record_pending(depth);
        result
    }

    fn drain_pending(&self) -> Result<()> {
        loop {
            let (consumer, item) = {
                let mut state = self.state.borrow_mut();
                if state.paused_by_downstream {
                    return Ok(());
                }
                let Some(consumer) = state.downstream.clone() else {
                    return Ok(());
                };
                match state.pending.pop_front() {
                    Some(item) => (consumer, item),
                    None => return Ok(()),
                }
            };
            self.record_delivered();
            consumer.receive(item)?;
        }
    }

    fn record_delivered(&self) {
        self.state.borrow_mut().stats.record_delivered();
        self.metrics.record_delivered();
        if self.config.tracing.item_events {
            trace_delivered(&self.label());
        }
    }

    pub(super) fn pause_from_downstream(&self) {
        let changed = {
            let mut state = self.state.borrow_mut();
            !std::mem::replace(&mut state.paused_by_downstream, true)
        };
        if changed {
            tracing::trace!(stage = %self.label(), "paused by downstream");
            self.sync_upstream();
        }
    }

    pub(super) fn resume_from_downstream(self: &Rc<Self>) {
        let changed = {
            let mut state = self.state.borrow_mut();
            std::mem::replace(&mut state.paused_by_downstream, false)
        };
        if !changed {
            return;
        }
        tracing::trace!(stage = %self.label(), "resumed by downstream");
        let result = self.flush().and_then(|()| self.forward_stop());
        if let Err(err) = result {
            // resume has nowhere to report to; the failing consumer already saw it
            tracing::error!(stage = %self.label(), error = %err, "unbuffering after resume failed");
        }
        self.sync_upstream();
    }

    pub(super) fn stop_upstream(&self) {
        if let Some(upstream) = self.upstream() {
            tracing::debug!(stage = %self.label(), "stopping upstream");
            upstream.stop_flow();
        }
    }

    /// Bring the upstream pause in line with the current state.
    ///
    /// Sends at most one call, and only when the effective state changes.
    pub(super) fn sync_upstream(&self) {
        let action = {
            let mut state = self.state.borrow_mut();
            let Some(upstream) = state.upstream.as_ref().and_then(Weak::upgrade) else {
                return;
            };
            let wanted = state.wants_upstream_paused();
            if wanted && !state.latch.is_engaged() {
                if state.latch.engage().is_err() {
                    return;
                }
                state.stats.upstream_pauses += 1;
                Some(UpstreamAction::Pause(upstream))
            } else if !wanted && state.latch.release() {
                state.stats.upstream_resumes += 1;
                Some(UpstreamAction::Resume(upstream))
            } else {
                None
            }
        };

        match action {
            Some(UpstreamAction::Pause(upstream)) => {
                self.metrics.record_pause();
                trace_upstream(&self.label(), true);
                upstream.pause_flow();
            }
            Some(UpstreamAction::Resume(upstream)) => {
                trace_upstream(&self.label(), false);
                upstream.resume_flow();
            }
            None => {}
        }
    }

    pub(super) fn record_switch(&self) {
        self.state.borrow_mut().stats.switches += 1;
        self.metrics.record_switch();
    }
}

fn same_consumer<T: 'static>(a: &Option<ConsumerRef<T>>, b: &Option<ConsumerRef<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
