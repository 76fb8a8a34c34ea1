//! TakeNode: forwards the first N events of a run, then drops the rest.

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineResult};
use crate::pipeline::node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorSpec};

#[derive(Debug, Clone)]
pub struct TakeSpec {
    limit: usize,
}

impl TakeSpec {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl ProcessorSpec for TakeSpec {
    fn name(&self) -> &str {
        "Take"
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Take(TakeNode {
            limit: self.limit,
            seen: 0,
        })))
    }
}

/// Per-run counter; a fresh instance starts from zero.
pub struct TakeNode {
    limit: usize,
    seen: usize,
}

impl TakeNode {
    pub fn name(&self) -> &str {
        "Take"
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        if self.seen < self.limit {
            self.seen += 1;
            ctx.emit(event);
        }
        Ok(())
    }

    pub fn seen(&self) -> usize {
        self.seen
    }
}
