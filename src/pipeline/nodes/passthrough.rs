//! PassthroughNode: forwards every event unchanged.

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineResult};
use crate::pipeline::node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorSpec};

/// Spec for a processor that forwards every event unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassthroughSpec;

impl PassthroughSpec {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessorSpec for PassthroughSpec {
    fn name(&self) -> &str {
        "Passthrough"
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Passthrough(
            PassthroughNode::new(),
        )))
    }
}

/// Passthrough node. Holds no state.
#[derive(Debug, Default)]
pub struct PassthroughNode;

impl PassthroughNode {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &str {
        "Passthrough"
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        ctx.emit(event);
        Ok(())
    }
}
