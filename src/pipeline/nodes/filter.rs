//! FilterNode: predicate-based event filtering.
//!
//! Events for which the predicate returns `true` pass through unchanged; the
//! rest are dropped. With `invert` set the sense is reversed.

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineResult};
use crate::pipeline::node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorSpec};
use std::fmt;
use std::sync::Arc;

/// Shared predicate type.
pub type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Spec for a filter step.
#[derive(Clone)]
pub struct FilterSpec {
    label: String,
    predicate: Predicate,
    invert: bool,
}

impl FilterSpec {
    pub fn new(predicate: impl Fn(&Event) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: "Filter".to_string(),
            predicate: Arc::new(predicate),
            invert: false,
        }
    }

    /// Keep only events that carry `field`.
    pub fn has_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(move |event| event.get(&field).is_some())
    }

    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Block matching events instead of allowing them.
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("label", &self.label)
            .field("invert", &self.invert)
            .finish_non_exhaustive()
    }
}

impl ProcessorSpec for FilterSpec {
    fn name(&self) -> &str {
        &self.label
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Filter(FilterNode {
            label: self.label.clone(),
            predicate: self.predicate.clone(),
            invert: self.invert,
            dropped: 0,
        })))
    }
}

/// Filter node instance.
pub struct FilterNode {
    label: String,
    predicate: Predicate,
    invert: bool,
    /// Events dropped during this run.
    dropped: u64,
}

impl FilterNode {
    pub fn name(&self) -> &str {
        &self.label
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        // Pass if: (matches AND !invert) OR (!matches AND invert)
        if (self.predicate)(&event) != self.invert {
            ctx.emit(event);
        } else {
            self.dropped += 1;
        }
        Ok(())
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
