//! Line protocol that switches to raw mode mid-stream.
//!
//! A line splitter feeds a command parser. When the parser sees `RAW`, it
//! switches the splitter over to a byte counter; whatever the splitter had
//! already split but not delivered is stitched back together and replayed
//! into the new chain.
//!
//! Run with `RUST_LOG=sluice=debug cargo run --example switching` to see
//! the coordinators at work.

use sluice::pipeline::Switcher;
use sluice::prelude::*;
use sluice::testing::{CollectingConsumer, FakeProducer};
use tracing_subscriber::EnvFilter;

/// Splits incoming chunks into lines.
struct Lines;

impl Stage<String> for Lines {
    fn received(&mut self, chunk: String) -> Result<Output<String>> {
        Ok(chunk.lines().map(str::to_string).collect())
    }

    fn switchable(&mut self) -> Option<&mut dyn Switchable<String>> {
        Some(self)
    }
}

impl Switchable<String> for Lines {
    fn reassemble(&mut self, residual: Vec<String>) -> Result<Output<String>> {
        if residual.is_empty() {
            return Ok(Output::None);
        }
        Ok(Output::single(residual.join("\n")))
    }
}

/// Handles commands until told to go raw.
struct Commands {
    raw: Option<(Switcher<String>, ConsumerRef<String>)>,
}

impl Stage<String> for Commands {
    fn received(&mut self, line: String) -> Result<Output<String>> {
        if line == "RAW" {
            if let Some((switcher, raw)) = self.raw.take() {
                switcher.switch(raw)?;
            }
            return Ok(Output::None);
        }
        Ok(Output::single(format!("command: {line}")))
    }

    fn name(&self) -> &str {
        "commands"
    }
}

/// Reports the size of each raw payload.
struct ByteCount;

impl Stage<String> for ByteCount {
    fn received(&mut self, payload: String) -> Result<Output<String>> {
        Ok(Output::single(format!("raw: {} bytes", payload.len())))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    sluice::observability::init_metrics();

    let output = CollectingConsumer::<String>::new();
    let raw = Chain::<String>::new()
        .stage(ByteCount)
        .into_consumer(output.clone())?;

    let lines = Coordinator::new(Lines);
    let Some(switcher) = lines.switcher() else {
        return Err(Error::InvalidSwitchState("line splitter cannot switch".to_string()));
    };
    let commands = Chain::<String>::new()
        .stage(Commands {
            raw: Some((switcher, raw)),
        })
        .into_consumer(output.clone())?;
    lines.producer().flow_to(Some(commands))?;

    let socket = FakeProducer::<String>::new();
    socket.flow_to(Some(lines.consumer()))?;

    socket.emit("HELLO\nLIST".to_string())?;
    socket.emit("RAW\nfirst payload\nsecond".to_string())?;
    socket.emit("third payload".to_string())?;
    socket.finish(StopReason::Finished)?;

    for line in output.received() {
        println!("{line}");
    }
    println!("{:?}: {:?}", lines, lines.stats());
    Ok(())
}
