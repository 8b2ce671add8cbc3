//! Integration tests for stage lifecycle, attachment and failures.

use std::cell::RefCell;
use std::rc::Rc;

use sluice::prelude::*;
use sluice::testing::{CollectingConsumer, FakeProducer};

#[derive(Debug, thiserror::Error)]
#[error("division by zero")]
struct DivideByZero;

#[derive(Debug, thiserror::Error)]
#[error("not a number: {0}")]
struct NotANumber(String);

/// Greets on start, says goodbye on stop and records the stop reason.
#[derive(Default)]
struct Greeter {
    stops: Rc<RefCell<Vec<String>>>,
}

impl Stage<String> for Greeter {
    fn received(&mut self, item: String) -> Result<Output<String>> {
        Ok(Output::single(item))
    }

    fn started(&mut self) -> Result<Output<String>> {
        Ok(Output::single("hello".to_string()))
    }

    fn stopped(&mut self, reason: &StopReason) -> Result<Output<String>> {
        self.stops.borrow_mut().push(reason.to_string());
        Ok(Output::single("bye".to_string()))
    }

    fn name(&self) -> &str {
        "greeter"
    }
}

struct Parse;

impl Stage<String> for Parse {
    fn received(&mut self, item: String) -> Result<Output<String>> {
        match item.parse::<i64>() {
            Ok(n) => Ok(Output::single((n * 10).to_string())),
            Err(_) => Err(Error::stage(NotANumber(item))),
        }
    }

    fn input_caps(&self) -> Option<Caps> {
        Some(Caps::new("text"))
    }

    fn output_caps(&self) -> Option<Caps> {
        Some(Caps::new("text/number"))
    }
}

#[test]
fn test_started_output_reaches_downstream() {
    let coordinator = Coordinator::new(Greeter::default());
    let sink = CollectingConsumer::<String>::new();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();

    let source = FakeProducer::<String>::new();
    source.flow_to(Some(coordinator.consumer())).unwrap();
    assert_eq!(sink.received(), vec!["hello".to_string()]);

    // A second upstream does not restart the stage
    let other = FakeProducer::<String>::new();
    other.flow_to(Some(coordinator.consumer())).unwrap();
    assert_eq!(sink.received(), vec!["hello".to_string()]);
}

#[test]
fn test_started_output_waits_for_downstream() {
    let coordinator = Coordinator::new(Greeter::default());
    let source = FakeProducer::<String>::new();
    source.flow_to(Some(coordinator.consumer())).unwrap();
    assert_eq!(coordinator.pending_len(), 1);
    assert!(source.is_paused());

    let sink = CollectingConsumer::<String>::new();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();
    assert_eq!(sink.received(), vec!["hello".to_string()]);
    assert!(!source.is_paused());
}

#[test]
fn test_stop_delivers_final_output_then_reason() {
    let stage = Greeter::default();
    let stops = Rc::clone(&stage.stops);
    let coordinator = Coordinator::new(stage);
    let sink = CollectingConsumer::<String>::new();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();

    let source = FakeProducer::<String>::new();
    source.flow_to(Some(coordinator.consumer())).unwrap();
    source.finish(StopReason::failed(DivideByZero)).unwrap();

    assert_eq!(*stops.borrow(), vec!["failed: division by zero".to_string()]);
    assert_eq!(sink.received(), vec!["hello".to_string(), "bye".to_string()]);
    let reasons = sink.stop_reasons();
    assert_eq!(reasons.len(), 1);
    assert!(reasons[0].downcast_ref::<DivideByZero>().is_some());
}

#[test]
fn test_stop_without_downstream_is_forwarded_on_attach() {
    let coordinator = Coordinator::new(Greeter::default());
    coordinator.consumer().flow_stopped(StopReason::Finished).unwrap();
    assert_eq!(coordinator.pending_len(), 1);

    let sink = CollectingConsumer::<String>::new();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();
    assert_eq!(sink.received(), vec!["bye".to_string()]);
    assert_eq!(sink.stop_reasons().len(), 1);
}

#[test]
fn test_stop_is_forwarded_after_paused_replay_drains() {
    let coordinator = Coordinator::new(Greeter::default());
    coordinator.deliver("queued".to_string()).unwrap();
    coordinator.consumer().flow_stopped(StopReason::Finished).unwrap();

    let sink = CollectingConsumer::<String>::pausing();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();
    assert_eq!(sink.received(), vec!["queued".to_string()]);
    assert!(sink.stop_reasons().is_empty());

    sink.resume();
    assert_eq!(sink.received(), vec!["queued".to_string(), "bye".to_string()]);
    assert_eq!(sink.stop_reasons().len(), 1);
}

#[test]
fn test_input_after_stop_is_ignored() {
    let coordinator = Coordinator::new(Greeter::default());
    let sink = CollectingConsumer::<String>::new();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();
    let input = coordinator.consumer();

    input.flow_stopped(StopReason::Finished).unwrap();
    input.flow_stopped(StopReason::Finished).unwrap();
    input.receive("late".to_string()).unwrap();

    assert_eq!(sink.received(), vec!["bye".to_string()]);
    assert_eq!(sink.stop_reasons().len(), 1);
}

#[test]
fn test_stage_failure_propagates_to_caller() {
    let coordinator = Coordinator::new(Parse);
    let sink = CollectingConsumer::<String>::new();
    coordinator.producer().flow_to(Some(sink.clone())).unwrap();
    let input = coordinator.consumer();

    let err = input.receive("twelve".to_string()).unwrap_err();
    assert!(matches!(err, Error::Stage(_)));
    assert_eq!(err.to_string(), "stage failed: not a number: twelve");

    // The coordinator is still usable
    input.receive("12".to_string()).unwrap();
    assert_eq!(sink.received(), vec!["120".to_string()]);
}

#[test]
fn test_type_mismatch_on_attach_upstream() {
    let coordinator = Coordinator::new(Parse);
    let bytes = FakeProducer::<String>::with_caps("bytes");

    let err = bytes.flow_to(Some(coordinator.consumer())).unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(bytes.consumer().is_none());
    assert!(coordinator.upstream().is_none());

    let text = FakeProducer::<String>::with_caps("text/plain");
    text.flow_to(Some(coordinator.consumer())).unwrap();
    assert!(coordinator.upstream().is_some());
}

#[test]
fn test_type_mismatch_on_attach_downstream_keeps_wiring() {
    let coordinator = Coordinator::new(Parse);
    let numbers = CollectingConsumer::<String>::with_caps("text/number");
    let numbers_ref: ConsumerRef<String> = numbers.clone();
    coordinator.producer().flow_to(Some(numbers_ref.clone())).unwrap();

    let images = CollectingConsumer::<String>::with_caps("image");
    let err = coordinator.producer().flow_to(Some(images.clone())).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(coordinator.is_flowing_to(&numbers_ref));
    assert!(images.producer().is_none());
}

#[test]
fn test_reentrant_flow_to_keeps_final_consumer() {
    /// Redirects its producer elsewhere as soon as it is attached.
    #[derive(Debug)]
    struct Redirect {
        target: RefCell<Option<ConsumerRef<String>>>,
    }

    impl Consumer<String> for Redirect {
        fn flowing_from(&self, producer: Option<ProducerRef<String>>) -> Result<Option<ProducerRef<String>>> {
            let target = self.target.borrow_mut().take();
            if let (Some(producer), Some(target)) = (producer, target) {
                producer.flow_to(Some(target))?;
            }
            Ok(None)
        }

        fn receive(&self, _item: String) -> Result<()> {
            Ok(())
        }

        fn flow_stopped(&self, _reason: StopReason) -> Result<()> {
            Ok(())
        }

        fn progress(&self, _amount: Option<f64>) -> Result<()> {
            Ok(())
        }
    }

    let coordinator = Coordinator::new(Greeter::default());
    let sink = CollectingConsumer::<String>::new();
    let sink_ref: ConsumerRef<String> = sink.clone();
    let redirect = Rc::new(Redirect {
        target: RefCell::new(Some(sink_ref.clone())),
    });

    coordinator.producer().flow_to(Some(redirect)).unwrap();
    assert!(coordinator.is_flowing_to(&sink_ref));

    coordinator.deliver("hello".to_string()).unwrap();
    assert_eq!(sink.received(), vec!["hello".to_string()]);
}

#[test]
fn test_debug_output() {
    let coordinator = Coordinator::new(Greeter::default());
    assert_eq!(format!("{coordinator:?}"), "Coordinator for greeter");
    assert_eq!(format!("{:?}", coordinator.consumer()), "Consumer for greeter");

    let producer = coordinator.producer();
    assert_eq!(format!("{producer:?}"), "Producer for greeter");

    drop(coordinator);
    assert_eq!(format!("{producer:?}"), "Producer for <dropped>");
    assert!(matches!(producer.flow_to(None), Err(Error::Detached)));
}
