//! Stages: the user-supplied units of computation.
//!
//! A [`Stage`] turns one input item into zero or more output items and
//! receives lifecycle notifications. Stages never see their neighbours; a
//! [`Coordinator`](crate::pipeline::Coordinator) owns each stage and does
//! all routing, buffering and flow control on its behalf.
//!
//! - [`Stage`]: the processing contract
//! - [`Switchable`]: optional capability for live switching
//! - [`Output`]: zero, one or many output items
//! - [`StageLink`]: non-owning back-reference to the owning coordinator

mod link;
mod output;
mod traits;

pub use link::StageLink;
pub use output::{Output, OutputIter};
pub use traits::{Stage, Switchable};
