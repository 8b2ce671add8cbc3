//! Building a series of stages in one call.
//!
//! A chain wraps each stage in its own [`Coordinator`] and flows each one
//! into the next. The caller gets back the consumer of the first
//! coordinator, which keeps the whole chain alive.
//!
//! # Example
//!
//! ```rust
//! use sluice::prelude::*;
//! use sluice::testing::{CollectingConsumer, FakeProducer};
//!
//! struct AddOne;
//! impl Stage<i32> for AddOne {
//!     fn received(&mut self, item: i32) -> Result<Output<i32>> {
//!         Ok(Output::single(item + 1))
//!     }
//! }
//!
//! struct Double;
//! impl Stage<i32> for Double {
//!     fn received(&mut self, item: i32) -> Result<Output<i32>> {
//!         Ok(Output::single(item * 2))
//!     }
//! }
//!
//! let sink = CollectingConsumer::<i32>::new();
//! let head = Chain::<i32>::new().stage(AddOne).stage(Double).into_consumer(sink.clone())?;
//!
//! let source = FakeProducer::<i32>::new();
//! source.flow_to(Some(head))?;
//! source.emit(3)?;
//! assert_eq!(sink.received(), vec![8]);
//! # Ok::<(), sluice::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::flow::ConsumerRef;
use crate::observability::span_chain;
use crate::stage::Stage;

use super::config::CoordinatorConfig;
use super::coordinator::Coordinator;

/// Builder for a series of coordinated stages.
pub struct Chain<T: 'static> {
    stages: Vec<Box<dyn Stage<T>>>,
    config: Option<CoordinatorConfig>,
}

impl<T: 'static> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Chain<T> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            config: None,
        }
    }

    /// Append a stage.
    pub fn stage<S: Stage<T>>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append an already boxed stage.
    pub fn boxed(mut self, stage: Box<dyn Stage<T>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Apply `config` to every coordinator.
    ///
    /// A configured name gets the stage's index appended, so coordinators
    /// stay distinguishable in logs and metrics.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if no stages were added.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wire the stages and return the consumer of the first one.
    ///
    /// A single-stage chain returns that stage's coordinator consumer.
    pub fn build(self) -> Result<ConsumerRef<T>> {
        self.build_with().map(|(head, _)| head)
    }

    /// Like [`build`](Chain::build), also returning every coordinator in
    /// order.
    pub fn build_with(self) -> Result<(ConsumerRef<T>, Vec<Coordinator<T>>)> {
        let coordinators = self.wire()?;
        let head = coordinators
            .first()
            .map(Coordinator::consumer)
            .ok_or(Error::EmptyChain)?;
        Ok((head, coordinators))
    }

    /// Wire the stages and flow the last one into `terminal`.
    ///
    /// An empty chain returns `terminal` itself.
    pub fn into_consumer(self, terminal: ConsumerRef<T>) -> Result<ConsumerRef<T>> {
        if self.is_empty() {
            return Ok(terminal);
        }
        let coordinators = self.wire()?;
        let (Some(first), Some(last)) = (coordinators.first(), coordinators.last()) else {
            return Err(Error::EmptyChain);
        };
        last.producer().flow_to(Some(terminal))?;
        Ok(first.consumer())
    }

    fn wire(self) -> Result<Vec<Coordinator<T>>> {
        if self.stages.is_empty() {
            return Err(Error::EmptyChain);
        }
        let _span = span_chain(self.stages.len()).entered();

        let config = self.config;
        let coordinators: Vec<Coordinator<T>> = self
            .stages
            .into_iter()
            .enumerate()
            .map(|(index, stage)| match &config {
                Some(config) => {
                    let mut config = config.clone();
                    if let Some(name) = config.name.take() {
                        config.name = Some(format!("{name}[{index}]"));
                    }
                    Coordinator::with_config(stage, config)
                }
                None => Coordinator::new(stage),
            })
            .collect();

        for pair in coordinators.windows(2) {
            pair[0].producer().flow_to(Some(pair[1].consumer()))?;
        }
        tracing::debug!(stages = coordinators.len(), "chain wired");
        Ok(coordinators)
    }
}

/// Wire `stages` into a chain and return the consumer of the first one.
///
/// Shorthand for [`Chain::build`].
pub fn chain<T: 'static>(stages: impl IntoIterator<Item = Box<dyn Stage<T>>>) -> Result<ConsumerRef<T>> {
    stages
        .into_iter()
        .fold(Chain::new(), Chain::boxed)
        .build()
}
