//! MapNode and SelectNode: per-event transforms.
//!
//! `MapNode` applies a fallible closure to each event. A failed transform is
//! a processing error for the whole run; wrap the closure yourself if a
//! failing event should be skipped instead.
//!
//! `SelectNode` keeps only a fixed set of data fields.

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineResult};
use crate::pipeline::node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorSpec};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Shared transform type.
pub type MapFn = Arc<dyn Fn(Event) -> Result<Event, NodeError> + Send + Sync>;

/// Spec for a map step.
#[derive(Clone)]
pub struct MapSpec {
    label: String,
    func: MapFn,
}

impl MapSpec {
    pub fn new(func: impl Fn(Event) -> Result<Event, NodeError> + Send + Sync + 'static) -> Self {
        Self {
            label: "Map".to_string(),
            func: Arc::new(func),
        }
    }

    /// Infallible transform.
    pub fn infallible(func: impl Fn(Event) -> Event + Send + Sync + 'static) -> Self {
        Self::new(move |event| Ok(func(event)))
    }

    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl fmt::Debug for MapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSpec")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl ProcessorSpec for MapSpec {
    fn name(&self) -> &str {
        &self.label
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Map(MapNode {
            label: self.label.clone(),
            func: self.func.clone(),
        })))
    }
}

pub struct MapNode {
    label: String,
    func: MapFn,
}

impl MapNode {
    pub fn name(&self) -> &str {
        &self.label
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        let mapped = (self.func)(event)?;
        ctx.emit(mapped);
        Ok(())
    }
}

/// Spec for a field projection step.
#[derive(Debug, Clone)]
pub struct SelectSpec {
    fields: Arc<HashSet<String>>,
}

impl SelectSpec {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Arc::new(fields.into_iter().map(Into::into).collect()),
        }
    }
}

impl ProcessorSpec for SelectSpec {
    fn name(&self) -> &str {
        "Select"
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Select(SelectNode {
            fields: self.fields.clone(),
        })))
    }
}

pub struct SelectNode {
    fields: Arc<HashSet<String>>,
}

impl SelectNode {
    pub fn name(&self) -> &str {
        "Select"
    }

    pub fn on_event(&mut self, mut event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        event.data.retain(|key, _| self.fields.contains(key));
        ctx.emit(event);
        Ok(())
    }
}
