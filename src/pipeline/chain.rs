//! Execution chain: linked, per-run processor instances.
//!
//! Messages cascade depth-first: each event a link emits is carried all the
//! way to the terminal before the link's next emitted event moves, so an input
//! event fully drains before the runner admits the next one.
//!
//! A flush visits every link once, in order. Each link first emits whatever
//! it buffered (those events drain through the rest of the chain as usual),
//! then the flush moves on. The terminal sees one flush, after all data.
//!
//! A link whose `on_flush` fails, or an output whose sink fails on the flush,
//! yields `PipelineError::Flush`. Events a link emits while flushing are
//! ordinary data downstream: a later link failing on one of them yields
//! `PipelineError::Processing` at that link's position.

use super::error::{NodeError, PipelineError, PipelineResult};
use super::id::SpecId;
use super::message::Message;
use super::node::{AnyProcessor, NodeContext};
use super::output::Terminal;
use super::resolver::ResolvedChain;
use crate::event::Event;

/// One processor instance and its counters.
pub struct ChainLink {
    pub spec: SpecId,
    processor: AnyProcessor,
    events_in: u64,
    events_out: u64,
}

impl ChainLink {
    pub fn name(&self) -> &str {
        self.processor.name()
    }
}

/// Per-link counters after (or during) a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub name: String,
    pub events_in: u64,
    pub events_out: u64,
}

/// Cloned processor instances linked head to tail, ending in an output.
pub struct ExecutionChain {
    links: Vec<ChainLink>,
    terminal: Terminal,
    terminal_name: String,
}

impl ExecutionChain {
    /// Instantiate every spec of `resolved`. No instance shares state with
    /// the specs or with another chain.
    pub fn build(resolved: &ResolvedChain, results_capacity: usize) -> PipelineResult<Self> {
        let links = resolved
            .specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Ok(ChainLink {
                    spec: SpecId(i as u32),
                    processor: spec.instantiate()?,
                    events_in: 0,
                    events_out: 0,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        tracing::debug!(
            "Built execution chain [{}] -> output '{}'",
            links.iter().map(|l| l.name()).collect::<Vec<_>>().join(" -> "),
            resolved.output_name
        );

        Ok(Self {
            links,
            terminal: Terminal::new(resolved.output.clone(), results_capacity),
            terminal_name: format!("output '{}'", resolved.output_name),
        })
    }

    /// Push one message into the head and drain it through the whole chain.
    pub fn push(&mut self, message: Message) -> PipelineResult<()> {
        let mut tail = Tail {
            terminal: &mut self.terminal,
            name: &self.terminal_name,
        };
        match message {
            Message::Event(event) => forward(&mut self.links, &mut tail, 0, event),
            Message::Flush => flush(&mut self.links, &mut tail, 0),
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn stats(&self) -> Vec<LinkStats> {
        self.links
            .iter()
            .map(|l| LinkStats {
                name: l.name().to_string(),
                events_in: l.events_in,
                events_out: l.events_out,
            })
            .collect()
    }

    pub fn results(&self) -> &[Event] {
        self.terminal.results()
    }

    pub fn take_results(&mut self) -> Vec<Event> {
        self.terminal.take_results()
    }

    /// Events that reached the output.
    pub fn terminal_events(&self) -> u64 {
        self.terminal.accepted()
    }

    /// Flushes that reached the output.
    pub fn terminal_flushes(&self) -> usize {
        self.terminal.flushes()
    }
}

struct Tail<'a> {
    terminal: &'a mut Terminal,
    name: &'a str,
}

fn forward(
    links: &mut [ChainLink],
    tail: &mut Tail<'_>,
    position: usize,
    event: Event,
) -> PipelineResult<()> {
    let Some((head, rest)) = links.split_first_mut() else {
        return tail
            .terminal
            .accept(event)
            .map_err(|source| processing_error(tail.name, position, source));
    };

    head.events_in += 1;
    let mut emitted = Vec::new();
    {
        let mut ctx = NodeContext::new(&mut emitted, position);
        head.processor
            .on_event(event, &mut ctx)
            .map_err(|source| processing_error(head.processor.name(), position, source))?;
    }
    head.events_out += emitted.len() as u64;

    for event in emitted {
        forward(rest, tail, position + 1, event)?;
    }
    Ok(())
}

fn flush(links: &mut [ChainLink], tail: &mut Tail<'_>, position: usize) -> PipelineResult<()> {
    let Some((head, rest)) = links.split_first_mut() else {
        return tail.terminal.accept_flush().map_err(|source| PipelineError::Flush {
            processor: tail.name.to_string(),
            position,
            source,
        });
    };

    let mut emitted = Vec::new();
    {
        let mut ctx = NodeContext::new(&mut emitted, position);
        head.processor
            .on_flush(&mut ctx)
            .map_err(|source| PipelineError::Flush {
                processor: head.processor.name().to_string(),
                position,
                source,
            })?;
    }
    head.events_out += emitted.len() as u64;
    if !emitted.is_empty() {
        tracing::trace!("{} flushed {} buffered events", head.name(), emitted.len());
    }

    for event in emitted {
        forward(rest, tail, position + 1, event)?;
    }
    flush(rest, tail, position + 1)
}

fn processing_error(processor: &str, position: usize, source: NodeError) -> PipelineError {
    PipelineError::Processing {
        processor: processor.to_string(),
        position,
        source,
    }
}
