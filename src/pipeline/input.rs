//! Pipeline inputs.
//!
//! An input reports whether it is bounded and hands out the sequence of
//! events for one run. Bounded inputs are finite and re-iterable, so the same
//! `Pipeline` can be run any number of times. Unbounded inputs never signal
//! exhaustion on their own; a run over one ends when the producer side goes
//! away.

use crate::event::Event;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

/// Iterator over the events of one run.
pub type EventIter<'a> = Box<dyn Iterator<Item = Event> + Send + 'a>;

/// Input contract consumed by the runner.
pub trait Input: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Whether the input is finite and signals exhaustion.
    fn is_bounded(&self) -> bool;

    /// Events for one run, in order.
    fn events(&self) -> PipelineResult<EventIter<'_>>;
}

/// Reference-counted input, shared by pipelines derived from each other.
pub type SharedInput = Arc<dyn Input>;

/// A finite, re-iterable collection of events.
#[derive(Debug, Clone)]
pub struct BoundedInput {
    name: String,
    events: Arc<[Event]>,
}

impl BoundedInput {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            name: "bounded".to_string(),
            events: events.into(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Read JSON-lines events. Blank lines are skipped.
    pub fn from_json_lines(reader: impl BufRead) -> PipelineResult<Self> {
        let mut events = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = Event::from_json_line(&line).map_err(|e| {
                PipelineError::Input(format!("line {}: {}", lineno + 1, e))
            })?;
            events.push(event);
        }
        Ok(Self::new(events))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }
}

impl From<Vec<Event>> for BoundedInput {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

impl Input for BoundedInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }

    fn events(&self) -> PipelineResult<EventIter<'_>> {
        Ok(Box::new(self.events.iter().cloned()))
    }
}

/// Unbounded push source backed by a crossbeam channel.
///
/// `events()` blocks waiting for the next event and ends once every sender
/// has been dropped. The channel is single-consumer: two concurrent runs over
/// the same `ChannelInput` split the stream between them.
#[derive(Debug, Clone)]
pub struct ChannelInput {
    name: String,
    rx: Receiver<Event>,
}

impl ChannelInput {
    /// Create an input plus the sender used to push events into it.
    pub fn new(capacity: usize) -> (Sender<Event>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (tx, Self::from_receiver(rx))
    }

    pub fn unbounded() -> (Sender<Event>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self::from_receiver(rx))
    }

    pub fn from_receiver(rx: Receiver<Event>) -> Self {
        Self {
            name: "channel".to_string(),
            rx,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Input for ChannelInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        false
    }

    fn events(&self) -> PipelineResult<EventIter<'_>> {
        Ok(Box::new(self.rx.iter()))
    }
}
