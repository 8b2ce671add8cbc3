//! Test doubles for the producer and consumer endpoints.
//!
//! - [`FakeProducer`]: a source driven by hand that counts flow-control calls
//! - [`CollectingConsumer`]: a sink that records everything it is given
//!
//! Both are useful for testing stages in isolation and for benchmarking
//! chains without real I/O at either end.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::caps::Caps;
use crate::error::{Error, Result};
use crate::flow::{Consumer, ConsumerRef, Producer, ProducerRef, StopReason};

// ============================================================================
// FakeProducer
// ============================================================================

/// A producer that emits only when told to.
///
/// # Example
///
/// ```rust
/// use sluice::prelude::*;
/// use sluice::testing::{CollectingConsumer, FakeProducer};
///
/// let source = FakeProducer::<u8>::new();
/// let sink = CollectingConsumer::<u8>::new();
/// source.flow_to(Some(sink.clone()))?;
///
/// source.emit(1)?;
/// source.emit(2)?;
/// assert_eq!(sink.received(), vec![1, 2]);
/// # Ok::<(), sluice::Error>(())
/// ```
pub struct FakeProducer<T: 'static> {
    this: Weak<FakeProducer<T>>,
    consumer: RefCell<Option<ConsumerRef<T>>>,
    pause_calls: Cell<usize>,
    resume_calls: Cell<usize>,
    stop_calls: Cell<usize>,
    caps: Option<Caps>,
}

impl<T: 'static> FakeProducer<T> {
    /// Create a producer with no declared caps.
    pub fn new() -> Rc<Self> {
        Self::build(None)
    }

    /// Create a producer declaring `caps` as its output.
    pub fn with_caps(caps: impl Into<Caps>) -> Rc<Self> {
        Self::build(Some(caps.into()))
    }

    fn build(caps: Option<Caps>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            consumer: RefCell::new(None),
            pause_calls: Cell::new(0),
            resume_calls: Cell::new(0),
            stop_calls: Cell::new(0),
            caps,
        })
    }

    /// The consumer currently flowed to.
    pub fn consumer(&self) -> Option<ConsumerRef<T>> {
        self.consumer.borrow().clone()
    }

    /// Check if more pauses than resumes have been received.
    pub fn is_paused(&self) -> bool {
        self.pause_calls.get() > self.resume_calls.get()
    }

    /// Number of `pause_flow` calls so far.
    pub fn pause_calls(&self) -> usize {
        self.pause_calls.get()
    }

    /// Number of `resume_flow` calls so far.
    pub fn resume_calls(&self) -> usize {
        self.resume_calls.get()
    }

    /// Check if `stop_flow` has been called.
    pub fn is_stopped(&self) -> bool {
        self.stop_calls.get() > 0
    }

    /// Hand `item` to the consumer.
    ///
    /// Pausing is advisory, so this emits even while paused. Without a
    /// consumer the item is dropped.
    pub fn emit(&self, item: T) -> Result<()> {
        match self.consumer() {
            Some(consumer) => consumer.receive(item),
            None => Ok(()),
        }
    }

    /// Report progress to the consumer.
    pub fn report_progress(&self, amount: Option<f64>) -> Result<()> {
        match self.consumer() {
            Some(consumer) => consumer.progress(amount),
            None => Ok(()),
        }
    }

    /// End the flow with `reason`.
    pub fn finish(&self, reason: StopReason) -> Result<()> {
        match self.consumer() {
            Some(consumer) => consumer.flow_stopped(reason),
            None => Ok(()),
        }
    }
}

impl<T: 'static> Producer<T> for FakeProducer<T> {
    fn flow_to(&self, consumer: Option<ConsumerRef<T>>) -> Result<Option<ProducerRef<T>>> {
        let this: ProducerRef<T> = self.this.upgrade().ok_or(Error::Detached)?;
        let previous = self.consumer.replace(consumer.clone());
        let Some(consumer) = consumer else {
            return Ok(None);
        };
        consumer.flowing_from(Some(this)).inspect_err(|_| {
            *self.consumer.borrow_mut() = previous;
        })
    }

    fn pause_flow(&self) {
        self.pause_calls.set(self.pause_calls.get() + 1);
    }

    fn resume_flow(&self) {
        self.resume_calls.set(self.resume_calls.get() + 1);
    }

    fn stop_flow(&self) {
        self.stop_calls.set(self.stop_calls.get() + 1);
    }

    fn output_caps(&self) -> Option<Caps> {
        self.caps.clone()
    }
}

impl<T: 'static> fmt::Debug for FakeProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeProducer")
            .field("pause_calls", &self.pause_calls.get())
            .field("resume_calls", &self.resume_calls.get())
            .field("stop_calls", &self.stop_calls.get())
            .finish()
    }
}

// ============================================================================
// CollectingConsumer
// ============================================================================

/// A consumer that records items, progress and stop reasons.
///
/// In [`pausing`](CollectingConsumer::pausing) mode it pauses its producer
/// after every item until [`resume`](CollectingConsumer::resume) is called,
/// which models a slow sink.
pub struct CollectingConsumer<T: 'static> {
    items: RefCell<Vec<T>>,
    progress: RefCell<Vec<Option<f64>>>,
    stops: RefCell<Vec<StopReason>>,
    producer: RefCell<Option<Weak<dyn Producer<T>>>>,
    pause_each: bool,
    holding_pause: Cell<bool>,
    caps: Option<Caps>,
}

impl<T: 'static> CollectingConsumer<T> {
    /// Create a consumer that accepts everything and never pauses.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::build(false, None))
    }

    /// Create a consumer that pauses its producer after each item.
    pub fn pausing() -> Rc<Self> {
        Rc::new(Self::build(true, None))
    }

    /// Create a consumer accepting only `caps`.
    pub fn with_caps(caps: impl Into<Caps>) -> Rc<Self> {
        Rc::new(Self::build(false, Some(caps.into())))
    }

    fn build(pause_each: bool, caps: Option<Caps>) -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            progress: RefCell::new(Vec::new()),
            stops: RefCell::new(Vec::new()),
            producer: RefCell::new(None),
            pause_each,
            holding_pause: Cell::new(false),
            caps,
        }
    }

    /// Progress notifications received so far.
    pub fn progress(&self) -> Vec<Option<f64>> {
        self.progress.borrow().clone()
    }

    /// Stop reasons received so far.
    pub fn stop_reasons(&self) -> Vec<StopReason> {
        self.stops.borrow().clone()
    }

    /// Number of items received so far.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Check if nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.borrow_mut())
    }

    /// The producer currently flowing here, if still alive.
    pub fn producer(&self) -> Option<ProducerRef<T>> {
        self.producer.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Release the pause this consumer holds, if any.
    pub fn resume(&self) {
        if !self.holding_pause.replace(false) {
            return;
        }
        if let Some(producer) = self.producer() {
            producer.resume_flow();
        }
    }

    /// Check if this consumer currently holds a pause on its producer.
    pub fn is_holding_pause(&self) -> bool {
        self.holding_pause.get()
    }
}

impl<T: Clone + 'static> CollectingConsumer<T> {
    /// Items received so far, in order.
    pub fn received(&self) -> Vec<T> {
        self.items.borrow().clone()
    }
}

impl<T: 'static> Consumer<T> for CollectingConsumer<T> {
    fn flowing_from(&self, producer: Option<ProducerRef<T>>) -> Result<Option<ProducerRef<T>>> {
        let same = match (self.producer(), &producer) {
            (Some(current), Some(producer)) => Rc::ptr_eq(&current, producer),
            _ => false,
        };
        *self.producer.borrow_mut() = producer.as_ref().map(Rc::downgrade);
        if !same {
            self.holding_pause.set(false);
        }
        Ok(None)
    }

    fn receive(&self, item: T) -> Result<()> {
        self.items.borrow_mut().push(item);
        if self.pause_each && !self.holding_pause.replace(true) {
            if let Some(producer) = self.producer() {
                producer.pause_flow();
            }
        }
        Ok(())
    }

    fn flow_stopped(&self, reason: StopReason) -> Result<()> {
        self.stops.borrow_mut().push(reason);
        Ok(())
    }

    fn progress(&self, amount: Option<f64>) -> Result<()> {
        self.progress.borrow_mut().push(amount);
        Ok(())
    }

    fn input_caps(&self) -> Option<Caps> {
        self.caps.clone()
    }
}

impl<T: 'static> fmt::Debug for CollectingConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectingConsumer")
            .field("items", &self.items.borrow().len())
            .field("stops", &self.stops.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_producer_counts_calls() {
        let source = FakeProducer::<u8>::new();
        source.pause_flow();
        assert!(source.is_paused());
        source.resume_flow();
        assert!(!source.is_paused());
        assert_eq!((source.pause_calls(), source.resume_calls()), (1, 1));

        source.stop_flow();
        assert!(source.is_stopped());
    }

    #[test]
    fn test_emit_without_consumer_drops() {
        let source = FakeProducer::<u8>::new();
        source.emit(1).unwrap();
        source.finish(StopReason::Finished).unwrap();
    }

    #[test]
    fn test_collecting_consumer_records() {
        let source = FakeProducer::<u8>::new();
        let sink = CollectingConsumer::<u8>::new();
        source.flow_to(Some(sink.clone())).unwrap();

        source.emit(4).unwrap();
        source.report_progress(Some(0.5)).unwrap();
        source.finish(StopReason::Finished).unwrap();

        assert_eq!(sink.received(), vec![4]);
        assert_eq!(sink.progress(), vec![Some(0.5)]);
        assert_eq!(sink.stop_reasons().len(), 1);
        assert!(sink.producer().is_some());
    }

    #[test]
    fn test_pausing_consumer_pauses_once() {
        let source = FakeProducer::<u8>::new();
        let sink = CollectingConsumer::<u8>::pausing();
        source.flow_to(Some(sink.clone())).unwrap();

        source.emit(1).unwrap();
        source.emit(2).unwrap();
        assert_eq!(source.pause_calls(), 1);
        assert!(sink.is_holding_pause());

        sink.resume();
        sink.resume();
        assert_eq!(source.resume_calls(), 1);
        assert_eq!(sink.take(), vec![1, 2]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_pause_survives_reattaching_same_producer() {
        let source = FakeProducer::<u8>::new();
        let sink = CollectingConsumer::<u8>::pausing();
        source.flow_to(Some(sink.clone())).unwrap();
        source.emit(1).unwrap();

        source.flow_to(Some(sink.clone())).unwrap();
        assert!(sink.is_holding_pause());

        let other = FakeProducer::<u8>::new();
        other.flow_to(Some(sink.clone())).unwrap();
        assert!(!sink.is_holding_pause());
    }

    #[test]
    fn test_declared_caps() {
        let source = FakeProducer::<u8>::with_caps("audio/raw");
        let sink = CollectingConsumer::<u8>::with_caps("video");
        // Caps are checked by coordinators, not by the fakes themselves
        source.flow_to(Some(sink.clone())).unwrap();
        assert_eq!(sink.input_caps(), Some(Caps::new("video")));
        assert_eq!(source.output_caps(), Some(Caps::new("audio/raw")));
    }
}
