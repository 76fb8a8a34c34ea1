//! Pipeline outputs: the terminal link of every execution chain.
//!
//! An `Output` is a descriptor attached to a pipeline. The runner turns it
//! into a terminal link that accepts the same event / flush shape a
//! processor's successor does.

use crate::event::Event;
use crate::pipeline::error::NodeError;
use crate::pipeline::message::Message;
use crossbeam_channel::Sender;
use std::fmt;
use std::sync::Arc;

/// User-provided terminal sink.
///
/// Sinks are shared between the pipeline and every run over it, so they take
/// `&self`; any state they keep needs its own synchronization.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &Event) -> Result<(), NodeError>;

    /// Called once, after every event of a run, when the run was forced to flush.
    fn on_flush(&self) -> Result<(), NodeError> {
        Ok(())
    }
}

/// Closure-backed sink built by [`Output::callback`].
struct CallbackSink<F> {
    func: F,
}

impl<F> EventSink for CallbackSink<F>
where
    F: Fn(&Event) -> Result<(), NodeError> + Send + Sync,
{
    fn on_event(&self, event: &Event) -> Result<(), NodeError> {
        (self.func)(event)
    }
}

/// Output descriptor.
#[derive(Clone)]
pub enum Output {
    /// Append events to the runner's `results` buffer.
    Collect,
    /// Forward every message, including the flush, to a channel.
    Channel(Sender<Message>),
    /// Log each event through `tracing` at info level.
    Log,
    /// Hand events to a user sink.
    Sink(Arc<dyn EventSink>),
}

impl Output {
    pub fn callback(func: impl Fn(&Event) -> Result<(), NodeError> + Send + Sync + 'static) -> Self {
        Output::Sink(Arc::new(CallbackSink { func }))
    }

    pub fn sink(sink: impl EventSink + 'static) -> Self {
        Output::Sink(Arc::new(sink))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Output::Collect => "collect",
            Output::Channel(_) => "channel",
            Output::Log => "log",
            Output::Sink(_) => "sink",
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Output::{}", self.kind())
    }
}

/// Per-run terminal link built from an `Output`.
pub(crate) struct Terminal {
    output: Output,
    results: Vec<Event>,
    accepted: u64,
    flushes: usize,
}

impl Terminal {
    pub(crate) fn new(output: Output, capacity: usize) -> Self {
        let results = match output {
            Output::Collect => Vec::with_capacity(capacity),
            _ => Vec::new(),
        };
        Self {
            output,
            results,
            accepted: 0,
            flushes: 0,
        }
    }

    pub(crate) fn accept(&mut self, event: Event) -> Result<(), NodeError> {
        self.accepted += 1;
        match &self.output {
            Output::Collect => self.results.push(event),
            Output::Channel(tx) => tx
                .send(Message::Event(event))
                .map_err(|_| "output channel disconnected")?,
            Output::Log => tracing::info!(
                timestamp = %event.timestamp,
                data = %serde_json::Value::Object(event.data.clone()),
                "event"
            ),
            Output::Sink(sink) => sink.on_event(&event)?,
        }
        Ok(())
    }

    pub(crate) fn accept_flush(&mut self) -> Result<(), NodeError> {
        self.flushes += 1;
        match &self.output {
            Output::Collect | Output::Log => {}
            Output::Channel(tx) => tx
                .send(Message::Flush)
                .map_err(|_| "output channel disconnected")?,
            Output::Sink(sink) => sink.on_flush()?,
        }
        Ok(())
    }

    pub(crate) fn results(&self) -> &[Event] {
        &self.results
    }

    pub(crate) fn take_results(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.results)
    }

    pub(crate) fn accepted(&self) -> u64 {
        self.accepted
    }

    pub(crate) fn flushes(&self) -> usize {
        self.flushes
    }
}
