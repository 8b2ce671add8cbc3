//! Non-owning link from a stage back to the coordinator that owns it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::pipeline::Coordinator;
use crate::pipeline::coordinator::Inner;

/// Shared slot pointing at a stage's current owner.
///
/// A stage that needs to reach its coordinator (to deliver out of band or to
/// request a switch) keeps one of these and returns it from
/// [`Stage::link`](crate::stage::Stage::link). Clones share the slot, so a
/// caller may keep a clone after handing the stage to a coordinator.
///
/// The link never keeps the coordinator alive.
pub struct StageLink<T: 'static> {
    slot: Rc<RefCell<Option<Weak<Inner<T>>>>>,
}

impl<T: 'static> StageLink<T> {
    /// Create an empty link.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// The coordinator currently owning the stage, if any.
    pub fn coordinator(&self) -> Option<Coordinator<T>> {
        self.slot
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Coordinator::from_inner)
    }

    /// Check whether the stage is installed in a live coordinator.
    pub fn is_attached(&self) -> bool {
        self.coordinator().is_some()
    }

    /// Check whether two links share the same slot.
    pub fn same_slot(&self, other: &StageLink<T>) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn attach(&self, owner: Weak<Inner<T>>) {
        *self.slot.borrow_mut() = Some(owner);
    }

    pub(crate) fn detach(&self) {
        self.slot.borrow_mut().take();
    }
}

impl<T: 'static> Clone for StageLink<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: 'static> Default for StageLink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for StageLink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageLink")
            .field("attached", &self.is_attached())
            .finish()
    }
}
