//! Producer and consumer contracts and flow-control bookkeeping.
//!
//! Data moves from a [`Producer`] to the single [`Consumer`] it flows to.
//! Consumers push back by pausing their producer; pausing is advisory and
//! propagates upstream through every coordinator on the way:
//!
//! ```text
//! Producer ──receive──> Coordinator ──receive──> Consumer
//!     ^                                              │
//!     └────────────── pause_flow / resume_flow ──────┘
//! ```
//!
//! Attachment is two-sided: `producer.flow_to(consumer)` records the
//! consumer and then calls `consumer.flowing_from(producer)`. A consumer
//! that is already wired onward passes the call along, so the return value
//! is the producer at the far end of the chain, or `None` when the chain
//! already ends in a consumer that produces nothing.
//!
//! ```rust,ignore
//! let tail = source.flow_to(Some(head))?;           // whole chain attached
//! tail.unwrap().flow_to(Some(sink))?;               // sink after the last stage
//! ```

mod pause;
mod stats;

pub use pause::PauseLatch;
pub use stats::FlowStats;

use std::fmt;
use std::rc::Rc;

use crate::caps::Caps;
use crate::error::Result;

/// Shared handle to a producer.
pub type ProducerRef<T> = Rc<dyn Producer<T>>;

/// Shared handle to a consumer.
pub type ConsumerRef<T> = Rc<dyn Consumer<T>>;

/// Something that emits items to at most one consumer at a time.
///
/// The `Debug` bound lets coordinators name their neighbours in logs.
pub trait Producer<T: 'static>: fmt::Debug {
    /// Start flowing to `consumer`, replacing any previous consumer.
    ///
    /// Implementations record the consumer and then call its
    /// [`flowing_from`](Consumer::flowing_from) with themselves, returning
    /// that result. `None` detaches the current consumer.
    fn flow_to(&self, consumer: Option<ConsumerRef<T>>) -> Result<Option<ProducerRef<T>>>;

    /// Ask this producer to stop emitting until resumed.
    fn pause_flow(&self);

    /// Undo an earlier [`pause_flow`](Producer::pause_flow).
    ///
    /// A producer that buffered while paused starts unbuffering from inside
    /// this call. There is no caller to hand a failure to, so an error
    /// raised while unbuffering is logged and dropped here; the consumer
    /// that failed has already seen it.
    fn resume_flow(&self);

    /// Ask this producer to stop permanently.
    fn stop_flow(&self);

    /// Caps of the items this producer emits, if declared.
    fn output_caps(&self) -> Option<Caps> {
        None
    }
}

/// Something that accepts items from at most one producer at a time.
pub trait Consumer<T: 'static>: fmt::Debug {
    /// `producer` is now flowing to this consumer (`None` when detached).
    ///
    /// Returns the last producer of the chain that continues past this
    /// consumer, if there is one. Consumers already flowing onward forward
    /// the announcement to their own consumer and return its answer.
    fn flowing_from(&self, producer: Option<ProducerRef<T>>) -> Result<Option<ProducerRef<T>>>;

    /// Accept one item.
    fn receive(&self, item: T) -> Result<()>;

    /// The producer will not emit any more items.
    fn flow_stopped(&self, reason: StopReason) -> Result<()>;

    /// Upstream made progress without emitting an item.
    fn progress(&self, amount: Option<f64>) -> Result<()>;

    /// Caps of the items this consumer accepts, if declared.
    fn input_caps(&self) -> Option<Caps> {
        None
    }
}

/// Why a flow ended.
///
/// Coordinators forward the reason without interpreting it; consumers may
/// inspect it with [`downcast_ref`](StopReason::downcast_ref).
#[derive(Clone, Debug)]
pub enum StopReason {
    /// The producer ran out of items.
    Finished,
    /// The producer failed.
    Failed(Rc<dyn std::error::Error + 'static>),
}

impl StopReason {
    /// Create a failure reason from an error.
    pub fn failed<E>(err: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Self::Failed(Rc::new(err))
    }

    /// Check if the flow ended with a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure as a concrete error type, if it is one.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Failed(err) => err.downcast_ref::<E>(),
            Self::Finished => None,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => f.write_str("finished"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
