//! # Sluice
//!
//! Push-based stream processing with flow control.
//!
//! Data is pushed through a chain of user-supplied [`Stage`](stage::Stage)s.
//! Each stage is owned by a [`Coordinator`](pipeline::Coordinator), which
//! handles everything the stage should not have to think about: buffering
//! output while nothing downstream can take it, pausing upstream exactly
//! once when it must, replaying the buffer when a consumer attaches, and
//! handing the stream over to a new downstream chain mid-flow.
//!
//! ## Features
//!
//! - **Backpressure**: pauses propagate upstream through every coordinator
//! - **Ordered delivery**: items reach each consumer in the order produced
//! - **Live switching**: a stage can redirect its stream, replaying what it
//!   had not yet delivered
//! - **Caps**: optional type tags checked when endpoints are attached
//! - **Reentrancy**: any callback may rewire the chain it is running in
//!
//! Everything is single-threaded and synchronous; the types are `!Send`.
//!
//! ## Quick Start
//!
//! ```rust
//! use sluice::prelude::*;
//! use sluice::testing::{CollectingConsumer, FakeProducer};
//!
//! struct Upper;
//!
//! impl Stage<String> for Upper {
//!     fn received(&mut self, item: String) -> Result<Output<String>> {
//!         Ok(Output::single(item.to_uppercase()))
//!     }
//! }
//!
//! let source = FakeProducer::<String>::new();
//! let sink = CollectingConsumer::<String>::new();
//!
//! let head = chain(vec![Box::new(Upper) as Box<dyn Stage<String>>])?;
//! let tail = source.flow_to(Some(head))?;
//! if let Some(tail) = tail {
//!     tail.flow_to(Some(sink.clone()))?;
//! }
//!
//! source.emit("quiet".to_string())?;
//! assert_eq!(sink.received(), vec!["QUIET".to_string()]);
//! # Ok::<(), sluice::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod caps;
pub mod error;
pub mod flow;
pub mod observability;
pub mod pipeline;
pub mod stage;
pub mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::caps::Caps;
    pub use crate::error::{Error, Result};
    pub use crate::flow::{Consumer, ConsumerRef, Producer, ProducerRef, StopReason};
    pub use crate::pipeline::{Chain, Coordinator, chain};
    pub use crate::stage::{Output, Stage, StageLink, Switchable};
}

pub use error::{Error, Result};
