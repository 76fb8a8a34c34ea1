//! Test processors and event builders

use pond_rs::pipeline::{
    AnyProcessor, NodeContext, NodeError, PipelineResult, ProcessorPlugin, ProcessorSpec,
};
use pond_rs::Event;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Builder for creating test events
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn at(millis: i64) -> Self {
        Self {
            event: Event::at_millis(millis),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.event.set(key, value);
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}

/// Appends its tag to the event's `trail` field, so the output shows which
/// processors an event went through and in what order.
#[derive(Debug, Clone)]
pub struct TagSpec {
    tag: String,
    instances: Arc<AtomicUsize>,
}

impl TagSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            instances: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many instances this spec has produced.
    pub fn instances(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }
}

impl ProcessorSpec for TagSpec {
    fn name(&self) -> &str {
        &self.tag
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        self.instances.fetch_add(1, Ordering::SeqCst);
        Ok(AnyProcessor::plugin(TagNode {
            tag: self.tag.clone(),
            seen: 0,
        }))
    }
}

struct TagNode {
    tag: String,
    seen: u64,
}

impl ProcessorPlugin for TagNode {
    fn name(&self) -> &str {
        &self.tag
    }

    fn on_event(&mut self, mut event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        self.seen += 1;
        let trail = match event.get("trail").and_then(Value::as_str) {
            Some(prev) => format!("{}>{}", prev, self.tag),
            None => self.tag.clone(),
        };
        event.set("trail", trail);
        event.set(format!("{}_seen", self.tag), self.seen);
        ctx.emit(event);
        Ok(())
    }
}

/// Emits every event `copies` times, each copy numbered under `copy`.
#[derive(Debug, Clone, Copy)]
pub struct FanOutSpec {
    pub copies: usize,
}

impl ProcessorSpec for FanOutSpec {
    fn name(&self) -> &str {
        "FanOut"
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::plugin(FanOutNode {
            copies: self.copies,
        }))
    }
}

struct FanOutNode {
    copies: usize,
}

impl ProcessorPlugin for FanOutNode {
    fn name(&self) -> &str {
        "FanOut"
    }

    fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        for copy in 0..self.copies {
            ctx.emit(event.clone().with("copy", copy as u64));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = EventBuilder::at(1_000).field("value", 2.5).build();
        assert_eq!(event.timestamp_millis(), 1_000);
        assert_eq!(event.get_f64("value"), Some(2.5));
    }
}
