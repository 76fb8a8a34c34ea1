//! AggregatorNode: fixed time-window aggregation over a numeric field.
//!
//! Windows are aligned to the Unix epoch: an event at `t` belongs to window
//! `floor(t / width)`. The node holds exactly one open window. An event that
//! falls into a later window closes the open one and emits its result; an
//! event that falls into an earlier window is rejected. A flush emits the
//! open window even though it never saw its boundary.
//!
//! Emitted events are stamped with the window start and carry the reduced
//! value under the output field (`null` when no event had a numeric value).

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineError, PipelineResult};
use crate::pipeline::node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Reduction applied to the values of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    First,
    Last,
}

impl Reducer {
    pub fn as_str(self) -> &'static str {
        match self {
            Reducer::Sum => "sum",
            Reducer::Avg => "avg",
            Reducer::Count => "count",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::First => "first",
            Reducer::Last => "last",
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reducer {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Reducer::Sum),
            "avg" | "mean" => Ok(Reducer::Avg),
            "count" => Ok(Reducer::Count),
            "min" => Ok(Reducer::Min),
            "max" => Ok(Reducer::Max),
            "first" => Ok(Reducer::First),
            "last" => Ok(Reducer::Last),
            other => Err(PipelineError::Configuration(format!(
                "Unknown reducer '{}'",
                other
            ))),
        }
    }
}

/// Spec for a windowed aggregation step.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    label: String,
    window_ms: i64,
    field: String,
    output_field: String,
    reducer: Reducer,
}

impl AggregateSpec {
    /// Fails when the window is shorter than one millisecond.
    pub fn new(window: Duration, field: impl Into<String>, reducer: Reducer) -> PipelineResult<Self> {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        if window_ms <= 0 {
            return Err(PipelineError::Configuration(
                "Aggregation window must be at least 1ms".to_string(),
            ));
        }
        let field = field.into();
        Ok(Self {
            label: format!("Aggregate({} {})", reducer, field),
            window_ms,
            output_field: field.clone(),
            field,
            reducer,
        })
    }

    /// Store the reduced value under a different field name.
    pub fn output_field(mut self, name: impl Into<String>) -> Self {
        self.output_field = name.into();
        self
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }
}

impl ProcessorSpec for AggregateSpec {
    fn name(&self) -> &str {
        &self.label
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Aggregate(
            AggregatorNode {
                spec: self.clone(),
                open: None,
                emitted: 0,
            },
        )))
    }
}

/// Running state of one window.
#[derive(Debug, Clone)]
struct Window {
    index: i64,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    first: Option<f64>,
    last: Option<f64>,
}

impl Window {
    fn new(index: i64) -> Self {
        Self {
            index,
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            first: None,
            last: None,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.first.get_or_insert(value);
        self.last = Some(value);
    }

    fn reduce(&self, reducer: Reducer) -> Value {
        let v = match reducer {
            Reducer::Count => return Value::from(self.count),
            _ if self.count == 0 => return Value::Null,
            Reducer::Sum => self.sum,
            Reducer::Avg => self.sum / self.count as f64,
            Reducer::Min => self.min,
            Reducer::Max => self.max,
            Reducer::First => self.first.unwrap_or(f64::NAN),
            Reducer::Last => self.last.unwrap_or(f64::NAN),
        };
        Value::from(v)
    }
}

/// Aggregator instance. Buffers one window at a time.
pub struct AggregatorNode {
    spec: AggregateSpec,
    open: Option<Window>,
    emitted: u64,
}

impl AggregatorNode {
    pub fn name(&self) -> &str {
        &self.spec.label
    }

    pub fn on_event(&mut self, event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        let ts = event.timestamp_millis();
        let index = ts.div_euclid(self.spec.window_ms);

        match self.open.as_ref().map(|w| w.index) {
            Some(open) if index < open => {
                return Err(format!(
                    "event at {}ms precedes the open window starting at {}ms",
                    ts,
                    open * self.spec.window_ms
                )
                .into());
            }
            Some(open) if index > open => {
                self.close(ctx);
                self.open = Some(Window::new(index));
            }
            Some(_) => {}
            None => self.open = Some(Window::new(index)),
        }

        if let (Some(window), Some(value)) = (self.open.as_mut(), event.get_f64(&self.spec.field)) {
            window.add(value);
        }
        Ok(())
    }

    pub fn on_flush(&mut self, ctx: &mut NodeContext) -> Result<(), NodeError> {
        self.close(ctx);
        Ok(())
    }

    /// Windows emitted during this run.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn close(&mut self, ctx: &mut NodeContext) {
        if let Some(window) = self.open.take() {
            let start = window.index.saturating_mul(self.spec.window_ms);
            let result = Event::at_millis(start)
                .with(self.spec.output_field.clone(), window.reduce(self.spec.reducer));
            tracing::trace!(
                "{} closed window at {}ms ({} values)",
                self.spec.label,
                start,
                window.count
            );
            self.emitted += 1;
            ctx.emit(result);
        }
    }
}
