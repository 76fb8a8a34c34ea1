//! Runner: drives one resolved chain from its input to its output.
//!
//! Each run:
//! 1. Reset results; re-instantiate processors if this runner already ran.
//! 2. Push every input event into the head of the chain, draining each fully.
//! 3. If forced and the input is bounded, push a single flush.
//! 4. Mark the run completed.
//!
//! Any processor or output failure aborts the run and is returned as is. A
//! runner that failed is left mid-run and must be discarded.

use crate::config::RunnerConfig;
use crate::event::Event;
use crate::pipeline::chain::{ExecutionChain, LinkStats};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::message::Message;
use crate::pipeline::pipeline::Pipeline;
use crate::pipeline::resolver::{ChainResolver, ResolvedChain};
use std::time::Instant;

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Created,
    Running,
    Completed,
}

/// Counters for the most recent run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Events read from the input.
    pub events_in: u64,
    /// Events that reached the output.
    pub events_out: u64,
    /// Whether a flush travelled the chain.
    pub flushed: bool,
    /// Per-processor counters, in chain order.
    pub links: Vec<LinkStats>,
}

/// Executes one pipeline + output pair.
pub struct Runner {
    resolved: ResolvedChain,
    chain: ExecutionChain,
    config: RunnerConfig,
    state: RunnerState,
    stats: RunStats,
}

impl Runner {
    /// Resolve `output` on `pipeline` and instantiate its chain.
    ///
    /// Fails before any event flows if the pipeline has no reachable input or
    /// the output cannot be resolved to a single chain.
    pub fn new(pipeline: &Pipeline, output: &str) -> PipelineResult<Self> {
        Self::with_config(pipeline, output, RunnerConfig::default())
    }

    pub fn with_config(
        pipeline: &Pipeline,
        output: &str,
        config: RunnerConfig,
    ) -> PipelineResult<Self> {
        let resolved = ChainResolver::new(config.max_chain_len).resolve(pipeline, output)?;
        Self::from_resolved(resolved, config)
    }

    /// Build a runner for an already resolved chain.
    pub fn from_resolved(resolved: ResolvedChain, config: RunnerConfig) -> PipelineResult<Self> {
        let chain = ExecutionChain::build(&resolved, config.results_capacity)?;
        Ok(Self {
            resolved,
            chain,
            config,
            state: RunnerState::Created,
            stats: RunStats::default(),
        })
    }

    /// Run the chain over the whole input.
    ///
    /// With `force`, processors holding buffered state (e.g. an open window)
    /// emit it once the bounded input is exhausted; without it that state is
    /// discarded. Flushing an unbounded input is a no-op.
    pub fn start(&mut self, force: bool) -> PipelineResult<&[Event]> {
        if self.state != RunnerState::Created {
            self.chain = ExecutionChain::build(&self.resolved, self.config.results_capacity)?;
        }
        self.stats = RunStats::default();
        self.state = RunnerState::Running;

        let input = self.resolved.input.clone();
        let started = Instant::now();
        tracing::info!(
            "Runner started: input '{}' -> {} processors -> output '{}'",
            input.name(),
            self.chain.len(),
            self.resolved.output_name
        );

        for event in input.events()? {
            self.stats.events_in += 1;
            self.chain.push(Message::Event(event))?;
        }

        if force {
            if input.is_bounded() {
                self.chain.push(Message::Flush)?;
                self.stats.flushed = true;
            } else {
                tracing::warn!(
                    "Flush requested on unbounded input '{}'; ignoring",
                    input.name()
                );
            }
        }

        self.stats.events_out = self.chain.terminal_events();
        self.stats.links = self.chain.stats();
        self.state = RunnerState::Completed;

        tracing::info!(
            "Runner completed: {} events in, {} out in {:?}",
            self.stats.events_in,
            self.stats.events_out,
            started.elapsed()
        );

        Ok(self.chain.results())
    }

    /// Run with the configured `force_flush` setting.
    pub fn start_default(&mut self) -> PipelineResult<&[Event]> {
        let force = self.config.force_flush;
        self.start(force)
    }

    /// Events collected by a `Collect` output during the last run.
    pub fn results(&self) -> &[Event] {
        self.chain.results()
    }

    pub fn into_results(mut self) -> Vec<Event> {
        self.chain.take_results()
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn resolved(&self) -> &ResolvedChain {
        &self.resolved
    }
}

/// Resolve, run once, and return the collected results.
pub fn run(pipeline: &Pipeline, output: &str, force: bool) -> PipelineResult<Vec<Event>> {
    let mut runner = Runner::new(pipeline, output)?;
    runner.start(force)?;
    Ok(runner.into_results())
}
