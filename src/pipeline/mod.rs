//! Coordinators and the chains built from them.
//!
//! This module provides the flow machinery around stages:
//!
//! - [`Coordinator`]: owns one stage, buffers its output and relays
//!   backpressure
//! - [`CoordinatorConsumer`], [`CoordinatorProducer`]: its two endpoints
//! - [`Switcher`]: live replacement of everything downstream of a stage
//! - [`Chain`], [`chain`]: wiring a series of stages in one call
//! - [`CoordinatorConfig`]: per-coordinator naming, warnings and tracing
//!
//! # Example
//!
//! ```rust
//! use sluice::prelude::*;
//! use sluice::testing::{CollectingConsumer, FakeProducer};
//!
//! struct Words;
//!
//! impl Stage<String> for Words {
//!     fn received(&mut self, line: String) -> Result<Output<String>> {
//!         Ok(line.split_whitespace().map(str::to_string).collect())
//!     }
//! }
//!
//! let source = FakeProducer::<String>::new();
//! let sink = CollectingConsumer::<String>::new();
//! let head = Chain::<String>::new().stage(Words).into_consumer(sink.clone())?;
//! source.flow_to(Some(head))?;
//!
//! source.emit("hello flowing world".to_string())?;
//! assert_eq!(sink.len(), 3);
//! # Ok::<(), sluice::Error>(())
//! ```

mod chain;
mod config;
pub(crate) mod coordinator;
mod endpoint;
mod switch;

pub use chain::{Chain, chain};
pub use config::{CoordinatorConfig, DEFAULT_PENDING_WARNING};
pub use coordinator::Coordinator;
pub use endpoint::{CoordinatorConsumer, CoordinatorProducer};
pub use switch::Switcher;
