//! Live switching of a coordinator's downstream chain.
//!
//! A switchable stage may decide, mid-stream, that everything after it
//! should be replaced by a different chain. Switching:
//!
//! 1. detaches the current downstream,
//! 2. collects every item the stage produced that never reached it,
//! 3. lets the stage [`reassemble`](crate::stage::Switchable::reassemble)
//!    those into replay items,
//! 4. attaches the new chain and delivers the replay items first,
//! 5. turns the coordinator into a passthrough for all later input.
//!
//! Items still queued for the old chain from the input being processed are
//! not delivered to it.

use std::rc::{Rc, Weak};

use crate::error::{Error, Result};
use crate::flow::ConsumerRef;
use crate::stage::Output;

use super::coordinator::Inner;

/// Switch-initiation surface of a coordinator owning a switchable stage.
///
/// Obtained from [`Coordinator::switcher`](super::Coordinator::switcher),
/// which returns `None` for plain stages.
pub struct Switcher<T: 'static> {
    inner: Weak<Inner<T>>,
}

impl<T: 'static> Switcher<T> {
    pub(super) fn new(inner: Weak<Inner<T>>) -> Self {
        Self { inner }
    }

    /// Route this coordinator's stream into `consumer` from now on.
    ///
    /// May be called from anywhere in the call stack, including from
    /// inside one of the stage's own hooks; in that case the switch
    /// completes as soon as that hook returns, and its output counts as
    /// residual. A hook that fails after asking still gets its switch.
    pub fn switch(&self, consumer: ConsumerRef<T>) -> Result<()> {
        let inner = self.inner.upgrade().ok_or(Error::Detached)?;
        inner.switch(consumer)
    }
}

impl<T: 'static> Clone for Switcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Inner<T> {
    pub(super) fn switch(self: &Rc<Self>, consumer: ConsumerRef<T>) -> Result<()> {
        {
            let state = self.state.borrow();
            if !state.switchable {
                return Err(Error::InvalidSwitchState(format!(
                    "stage {} is not switchable",
                    self.label()
                )));
            }
            if state.switched || state.deferred_switch.is_some() {
                return Err(Error::InvalidSwitchState(format!(
                    "stage {} has already switched",
                    self.label()
                )));
            }
        }

        if self.stage_is_busy() {
            // The stage is switching itself from inside a hook
            tracing::debug!(stage = %self.label(), "switch deferred until hook returns");
            self.state.borrow_mut().deferred_switch = Some(consumer);
            return Ok(());
        }
        self.complete_switch(consumer, Output::None)
    }

    /// Detach, reassemble, reattach and replay.
    ///
    /// `extra` is output the stage returned from the hook that requested the
    /// switch; it was never delivered, so it joins the residual.
    pub(super) fn complete_switch(
        self: &Rc<Self>,
        consumer: ConsumerRef<T>,
        extra: Output<T>,
    ) -> Result<()> {
        let (residual, previous) = {
            let mut state = self.state.borrow_mut();
            state.switched = true;
            state.epoch += 1;
            state.paused_by_downstream = false;
            state.output_caps = None;

            let mut residual: Vec<T> = state.pending.drain(..).collect();
            residual.extend(state.in_flight.drain(..));
            residual.extend(extra);
            (residual, state.downstream.take())
        };
        tracing::debug!(
            stage = %self.label(),
            residual = residual.len(),
            "switching downstream"
        );

        if let Some(previous) = previous {
            previous.flowing_from(None)?;
        }

        let replay = self.call_stage("reassemble", |stage| match stage.switchable() {
            Some(switchable) => switchable.reassemble(residual),
            None => Err(Error::InvalidSwitchState(
                "stage lost its switch capability".to_string(),
            )),
        })?;

        self.producer_ref().flow_to(Some(consumer))?;
        for item in replay {
            self.deliver(item)?;
        }
        self.sync_upstream();

        self.record_switch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pipeline::{Coordinator, chain};
    use crate::prelude::*;
    use crate::stage::StageLink;
    use crate::testing::{CollectingConsumer, FakeProducer};

    /// Splits on commas; reassembly rejoins what was left.
    #[derive(Default)]
    struct CommaSplitter {
        link: StageLink<String>,
    }

    impl Stage<String> for CommaSplitter {
        fn received(&mut self, item: String) -> Result<Output<String>> {
            Ok(item.split(',').map(str::to_string).collect())
        }

        fn link(&self) -> Option<&StageLink<String>> {
            Some(&self.link)
        }

        fn switchable(&mut self) -> Option<&mut dyn Switchable<String>> {
            Some(self)
        }
    }

    impl Switchable<String> for CommaSplitter {
        fn reassemble(&mut self, residual: Vec<String>) -> Result<Output<String>> {
            if residual.is_empty() {
                return Ok(Output::None);
            }
            Ok(Output::single(residual.join(",")))
        }
    }

    /// Switches its own coordinator when it sees "raw" and returns the rest.
    struct SelfSwitcher {
        link: StageLink<String>,
        target: Option<ConsumerRef<String>>,
    }

    impl Stage<String> for SelfSwitcher {
        fn received(&mut self, item: String) -> Result<Output<String>> {
            if item == "raw" {
                if let (Some(coordinator), Some(target)) = (self.link.coordinator(), self.target.take()) {
                    coordinator.switch(target)?;
                }
                return Ok(Output::from(vec!["left".to_string(), "over".to_string()]));
            }
            Ok(Output::single(format!("cooked {item}")))
        }

        fn link(&self) -> Option<&StageLink<String>> {
            Some(&self.link)
        }

        fn switchable(&mut self) -> Option<&mut dyn Switchable<String>> {
            Some(self)
        }
    }

    impl Switchable<String> for SelfSwitcher {
        fn reassemble(&mut self, residual: Vec<String>) -> Result<Output<String>> {
            Ok(residual.into_iter().map(|s| s.to_uppercase()).collect())
        }
    }

    /// Switches its own coordinator from `progressed`, or from `received`
    /// right before failing on "fail".
    struct HookSwitcher {
        link: StageLink<String>,
        target: Option<ConsumerRef<String>>,
    }

    impl HookSwitcher {
        fn new(target: ConsumerRef<String>) -> Self {
            Self {
                link: StageLink::new(),
                target: Some(target),
            }
        }

        fn switch_now(&mut self) -> Result<()> {
            match (self.link.coordinator(), self.target.take()) {
                (Some(coordinator), Some(target)) => coordinator.switch(target),
                _ => Ok(()),
            }
        }
    }

    impl Stage<String> for HookSwitcher {
        fn received(&mut self, item: String) -> Result<Output<String>> {
            if item == "fail" {
                self.switch_now()?;
                return Err(Error::stage("cannot parse fail"));
            }
            Ok(Output::single(format!("old {item}")))
        }

        fn progressed(&mut self, _amount: Option<f64>) {
            self.switch_now().unwrap();
        }

        fn link(&self) -> Option<&StageLink<String>> {
            Some(&self.link)
        }

        fn switchable(&mut self) -> Option<&mut dyn Switchable<String>> {
            Some(self)
        }
    }

    impl Switchable<String> for HookSwitcher {
        fn reassemble(&mut self, residual: Vec<String>) -> Result<Output<String>> {
            Ok(Output::from(residual))
        }
    }

    #[test]
    fn test_switch_from_progress_hook_completes_on_return() {
        let new = CollectingConsumer::<String>::new();
        let coordinator = Coordinator::new(HookSwitcher::new(new.clone()));
        let old = CollectingConsumer::<String>::new();
        coordinator.producer().flow_to(Some(old.clone())).unwrap();

        coordinator.consumer().progress(Some(0.5)).unwrap();
        assert!(coordinator.is_switched());
        assert!(old.producer().is_none());
        // The progress that triggered the switch reaches the new chain
        assert_eq!(new.progress(), vec![Some(0.5)]);

        coordinator.consumer().receive("next".to_string()).unwrap();
        assert_eq!(new.received(), vec!["next".to_string()]);
        assert!(old.received().is_empty());
    }

    #[test]
    fn test_switch_from_failing_hook_still_completes() {
        let new = CollectingConsumer::<String>::new();
        let coordinator = Coordinator::new(HookSwitcher::new(new.clone()));
        let old = CollectingConsumer::<String>::new();
        coordinator.producer().flow_to(Some(old.clone())).unwrap();

        let err = coordinator
            .consumer()
            .receive("fail".to_string())
            .unwrap_err();
        assert!(matches!(err, Error::Stage(_)));
        assert!(coordinator.is_switched());

        // Later input is passed through, not handled by the old stage
        coordinator.consumer().receive("next".to_string()).unwrap();
        assert!(old.received().is_empty());
        assert_eq!(new.received(), vec!["next".to_string()]);
    }

    #[test]
    fn test_switch_before_any_data() {
        let coordinator = Coordinator::new(CommaSplitter::default());
        let old = CollectingConsumer::<String>::new();
        let new = CollectingConsumer::<String>::new();
        coordinator.producer().flow_to(Some(old.clone())).unwrap();

        coordinator.switch(new.clone()).unwrap();
        assert!(coordinator.is_switched());
        assert!(coordinator.switcher().is_none());
        assert!(old.producer().is_none());

        coordinator.consumer().receive("a,b".to_string()).unwrap();
        assert!(old.received().is_empty());
        // Passthrough: the stage no longer splits
        assert_eq!(new.received(), vec!["a,b".to_string()]);
        assert_eq!(coordinator.stats().switches, 1);
    }

    #[test]
    fn test_switch_replays_buffered_items() {
        let coordinator = Coordinator::new(CommaSplitter::default());
        let source = FakeProducer::<String>::new();
        source.flow_to(Some(coordinator.consumer())).unwrap();

        // No downstream yet: both pieces wait, upstream gets paused
        source.emit("x,y".to_string()).unwrap();
        assert_eq!(coordinator.pending_len(), 2);
        assert!(source.is_paused());

        let new = CollectingConsumer::<String>::new();
        coordinator.switcher().unwrap().switch(new.clone()).unwrap();
        assert_eq!(new.received(), vec!["x,y".to_string()]);
        assert_eq!(coordinator.pending_len(), 0);
        assert!(!source.is_paused());
    }

    #[test]
    fn test_second_switch_is_rejected() {
        let coordinator = Coordinator::new(CommaSplitter::default());
        coordinator.switch(CollectingConsumer::<String>::new()).unwrap();
        let err = coordinator
            .switch(CollectingConsumer::<String>::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSwitchState(_)));
    }

    #[test]
    fn test_stage_switching_itself_inside_received() {
        let new = CollectingConsumer::<String>::new();
        let coordinator = Coordinator::new(SelfSwitcher {
            link: StageLink::new(),
            target: Some(new.clone()),
        });
        let old = CollectingConsumer::<String>::new();
        coordinator.producer().flow_to(Some(old.clone())).unwrap();

        let input = coordinator.consumer();
        input.receive("egg".to_string()).unwrap();
        input.receive("raw".to_string()).unwrap();
        input.receive("tail".to_string()).unwrap();

        assert_eq!(old.received(), vec!["cooked egg".to_string()]);
        assert_eq!(
            new.received(),
            vec!["LEFT".to_string(), "OVER".to_string(), "tail".to_string()]
        );
    }

    #[test]
    fn test_switch_into_chain() {
        struct Shout;

        impl Stage<String> for Shout {
            fn received(&mut self, item: String) -> Result<Output<String>> {
                Ok(Output::single(format!("{item}!")))
            }
        }

        let coordinator = Coordinator::new(CommaSplitter::default());
        let sink = CollectingConsumer::<String>::new();
        let replacement = Chain::<String>::new().stage(Shout).into_consumer(sink.clone()).unwrap();

        coordinator.switch(replacement).unwrap();
        coordinator.consumer().receive("hey".to_string()).unwrap();
        assert_eq!(sink.received(), vec!["hey!".to_string()]);

        // chain() accepts boxed stages directly
        let other = chain(vec![Box::new(Shout) as Box<dyn Stage<String>>]).unwrap();
        other.receive("solo".to_string()).unwrap();
    }
}
