//! Declarative, linear event pipelines.
//!
//! A `Pipeline` is an immutable description: an input, an ordered list of
//! processor specs, and named outputs. A `Runner` resolves one output back to
//! its chain and input, clones every spec into a fresh instance, and drives
//! events through.
//!
//! # Architecture
//!
//! ```text
//! [Input] ──► [Processor 0] ──► [Processor 1] ──► ... ──► [Output]
//!                                                 (Event | Flush)
//! ```
//!
//! # Design
//!
//! - **Freeze at attach**: each output keeps the processor snapshot it was attached behind.
//! - **Clone per run**: specs are shared read-only; every run owns its instances.
//! - **Enum dispatch on hot path**: `BuiltinProcessor` enum for built-in kinds.
//! - **Strict draining**: one input event reaches the output before the next is read.
//! - **Flush is a message**: `Message::Flush` never masquerades as data.

pub mod chain;
pub mod error;
pub mod id;
pub mod input;
pub mod message;
pub mod node;
pub mod nodes;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod output;
pub mod resolver;
pub mod runner;

pub use chain::{ExecutionChain, LinkStats};
pub use error::{NodeError, PipelineError, PipelineResult};
pub use id::{OutputId, SpecId};
pub use input::{BoundedInput, ChannelInput, EventIter, Input, SharedInput};
pub use message::Message;
pub use node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorPlugin, ProcessorSpec, SharedSpec};
pub use output::{EventSink, Output};
pub use pipeline::{ChainSnapshot, OutputBinding, Pipeline, PipelineState, Root};
pub use resolver::{ChainResolver, ResolvedChain};
pub use runner::{run, RunStats, Runner, RunnerState};
