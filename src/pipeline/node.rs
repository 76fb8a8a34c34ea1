//! Processor abstraction for the pipeline.
//!
//! Two layers, mirroring how a pipeline is declared and how it runs:
//! - **`ProcessorSpec`**: immutable, shareable description held by a `Pipeline`.
//!   `instantiate()` produces a fresh runtime instance with empty state.
//! - **`AnyProcessor`**: the per-run instance. Built-in kinds use the
//!   `BuiltinProcessor` enum so the chain can dispatch without a vtable;
//!   user kinds go through the `ProcessorPlugin` trait object.

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineResult};
use crate::pipeline::nodes::{
    AggregatorNode, FilterNode, MapNode, PassthroughNode, ScriptNode, SelectNode, TakeNode,
};
use std::fmt;
use std::sync::Arc;

/// Context passed to a processor for each message.
pub struct NodeContext<'a> {
    /// Events emitted by this processor, forwarded downstream in order.
    output: &'a mut Vec<Event>,
    /// Position of the processor within its chain.
    pub position: usize,
}

impl<'a> NodeContext<'a> {
    pub fn new(output: &'a mut Vec<Event>, position: usize) -> Self {
        Self { output, position }
    }

    /// Forward an event to the successor link.
    #[inline]
    pub fn emit(&mut self, event: Event) {
        self.output.push(event);
    }

    /// Number of events emitted so far in this call.
    #[inline]
    pub fn emitted(&self) -> usize {
        self.output.len()
    }
}

/// Immutable description of one transformation step.
///
/// Implementations must not share mutable runtime state between the spec and
/// the instances it produces, nor between two instances.
pub trait ProcessorSpec: Send + Sync + fmt::Debug {
    /// Human-readable name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Build a fresh runtime instance with empty buffers and counters.
    fn instantiate(&self) -> PipelineResult<AnyProcessor>;
}

/// Reference-counted spec, shared between pipelines, outputs and runs.
pub type SharedSpec = Arc<dyn ProcessorSpec>;

/// Trait for user-defined processor instances.
pub trait ProcessorPlugin: Send {
    /// Human-readable name of this processor.
    fn name(&self) -> &str;

    /// Consume one event, emitting zero or more events via `ctx`.
    fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError>;

    /// Emit any buffered state. The chain forwards the flush afterwards.
    fn on_flush(&mut self, _ctx: &mut NodeContext) -> Result<(), NodeError> {
        Ok(())
    }
}

/// Enum dispatch for built-in processors.
pub enum BuiltinProcessor {
    Passthrough(PassthroughNode),
    Filter(FilterNode),
    Map(MapNode),
    Select(SelectNode),
    Take(TakeNode),
    Script(ScriptNode),
    Aggregate(AggregatorNode),
}

impl BuiltinProcessor {
    pub fn name(&self) -> &str {
        match self {
            BuiltinProcessor::Passthrough(n) => n.name(),
            BuiltinProcessor::Filter(n) => n.name(),
            BuiltinProcessor::Map(n) => n.name(),
            BuiltinProcessor::Select(n) => n.name(),
            BuiltinProcessor::Take(n) => n.name(),
            BuiltinProcessor::Script(n) => n.name(),
            BuiltinProcessor::Aggregate(n) => n.name(),
        }
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        match self {
            BuiltinProcessor::Passthrough(n) => n.on_event(event, ctx),
            BuiltinProcessor::Filter(n) => n.on_event(event, ctx),
            BuiltinProcessor::Map(n) => n.on_event(event, ctx),
            BuiltinProcessor::Select(n) => n.on_event(event, ctx),
            BuiltinProcessor::Take(n) => n.on_event(event, ctx),
            BuiltinProcessor::Script(n) => n.on_event(event, ctx),
            BuiltinProcessor::Aggregate(n) => n.on_event(event, ctx),
        }
    }

    pub fn on_flush(&mut self, ctx: &mut NodeContext) -> Result<(), NodeError> {
        match self {
            BuiltinProcessor::Aggregate(n) => n.on_flush(ctx),
            // Stateless or counter-only kinds hold nothing to emit.
            _ => Ok(()),
        }
    }
}

/// Wrapper that holds either a built-in processor (enum dispatch) or a plugin (trait object).
pub enum AnyProcessor {
    Builtin(BuiltinProcessor),
    Plugin(Box<dyn ProcessorPlugin>),
}

impl AnyProcessor {
    pub fn plugin(plugin: impl ProcessorPlugin + 'static) -> Self {
        AnyProcessor::Plugin(Box::new(plugin))
    }

    pub fn name(&self) -> &str {
        match self {
            AnyProcessor::Builtin(n) => n.name(),
            AnyProcessor::Plugin(n) => n.name(),
        }
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        match self {
            AnyProcessor::Builtin(n) => n.on_event(event, ctx),
            AnyProcessor::Plugin(n) => n.on_event(event, ctx),
        }
    }

    pub fn on_flush(&mut self, ctx: &mut NodeContext) -> Result<(), NodeError> {
        match self {
            AnyProcessor::Builtin(n) => n.on_flush(ctx),
            AnyProcessor::Plugin(n) => n.on_flush(ctx),
        }
    }
}

impl fmt::Debug for AnyProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyProcessor::Builtin(n) => f.debug_tuple("Builtin").field(&n.name()).finish(),
            AnyProcessor::Plugin(n) => f.debug_tuple("Plugin").field(&n.name()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl ProcessorPlugin for Doubler {
        fn name(&self) -> &str {
            "Doubler"
        }

        fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
            ctx.emit(event.clone());
            ctx.emit(event);
            Ok(())
        }
    }

    #[test]
    fn test_plugin_dispatch() {
        let mut node = AnyProcessor::plugin(Doubler);
        let mut out = Vec::new();
        let mut ctx = NodeContext::new(&mut out, 0);
        node.on_event(Event::at_millis(1), &mut ctx).unwrap();
        assert_eq!(ctx.emitted(), 2);
        node.on_flush(&mut ctx).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(node.name(), "Doubler");
    }

    #[test]
    fn test_builtin_dispatch() {
        let mut node = AnyProcessor::Builtin(BuiltinProcessor::Passthrough(PassthroughNode::new()));
        let mut out = Vec::new();
        let mut ctx = NodeContext::new(&mut out, 3);
        assert_eq!(ctx.position, 3);
        node.on_event(Event::at_millis(7), &mut ctx).unwrap();
        assert_eq!(out[0].timestamp_millis(), 7);
        assert_eq!(format!("{:?}", node), "Builtin(\"Passthrough\")");
    }
}
