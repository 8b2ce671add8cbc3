//! Producer and consumer views over a coordinator.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::caps::Caps;
use crate::error::{Error, Result};
use crate::flow::{Consumer, ConsumerRef, Producer, ProducerRef, StopReason};

use super::coordinator::Inner;

/// Upstream-facing endpoint of a coordinator.
///
/// Holds the coordinator strongly: whoever flows into a coordinator keeps
/// it alive.
pub struct CoordinatorConsumer<T: 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: 'static> CoordinatorConsumer<T> {
    pub(super) fn new(inner: Rc<Inner<T>>) -> Self {
        Self { inner }
    }
}

impl<T: 'static> Consumer<T> for CoordinatorConsumer<T> {
    fn flowing_from(&self, producer: Option<ProducerRef<T>>) -> Result<Option<ProducerRef<T>>> {
        self.inner.flowing_from(producer)
    }

    fn receive(&self, item: T) -> Result<()> {
        self.inner.receive(item)
    }

    fn flow_stopped(&self, reason: StopReason) -> Result<()> {
        self.inner.flow_stopped(reason)
    }

    fn progress(&self, amount: Option<f64>) -> Result<()> {
        self.inner.progress(amount)
    }

    fn input_caps(&self) -> Option<Caps> {
        let state = self.inner.state.borrow();
        if state.switched {
            None
        } else {
            state.input_caps.clone()
        }
    }
}

impl<T: 'static> fmt::Debug for CoordinatorConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Consumer for {}", self.inner.label())
    }
}

/// Downstream-facing endpoint of a coordinator.
///
/// Owned by the coordinator itself and handed out as a shared reference;
/// it does not keep the coordinator alive.
pub struct CoordinatorProducer<T: 'static> {
    inner: Weak<Inner<T>>,
}

impl<T: 'static> CoordinatorProducer<T> {
    pub(super) fn new(inner: Weak<Inner<T>>) -> Self {
        Self { inner }
    }
}

impl<T: 'static> Producer<T> for CoordinatorProducer<T> {
    fn flow_to(&self, consumer: Option<ConsumerRef<T>>) -> Result<Option<ProducerRef<T>>> {
        let inner = self.inner.upgrade().ok_or(Error::Detached)?;
        inner.flow_to(consumer)
    }

    fn pause_flow(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.pause_from_downstream();
        }
    }

    fn resume_flow(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.resume_from_downstream();
        }
    }

    fn stop_flow(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.stop_upstream();
        }
    }

    fn output_caps(&self) -> Option<Caps> {
        let inner = self.inner.upgrade()?;
        let caps = inner.state.borrow().output_caps.clone();
        caps
    }
}

impl<T: 'static> fmt::Debug for CoordinatorProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.upgrade() {
            Some(inner) => write!(f, "Producer for {}", inner.label()),
            None => f.write_str("Producer for <dropped>"),
        }
    }
}
