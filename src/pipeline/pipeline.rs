//! Immutable pipeline descriptions.
//!
//! A `Pipeline` is a value: every derivation (`with_input`, `add_processor`,
//! `attach_output`) returns a new pipeline and leaves the original untouched.
//! Processor specs live in a shared `Arc<[SharedSpec]>`; deriving copies the
//! handles, never the specs.
//!
//! Each output freezes the processor sequence at the moment it is attached,
//! so processors added later never reach an output that already exists.
//!
//! Appending a processor or an output copies the existing handles into a new
//! slice, so building an n-step chain costs O(n^2) `Arc` clones. Derivations
//! that do not append (`with_input`, `attach_output` for the processors) keep
//! pointing at the same slice, and every run reads it without copying.

use crate::event::Event;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::OutputId;
use crate::pipeline::input::{Input, SharedInput};
use crate::pipeline::node::{ProcessorSpec, SharedSpec};
use crate::pipeline::nodes::{FilterSpec, MapSpec, SelectSpec, TakeSpec};
use crate::pipeline::output::Output;
use std::fmt;
use std::sync::Arc;

/// Frozen, shared processor sequence.
pub type ChainSnapshot = Arc<[SharedSpec]>;

/// Where a pipeline's events come from.
#[derive(Clone)]
pub enum Root {
    /// A bounded or unbounded event source.
    Source(SharedInput),
    /// Another pipeline, captured when it was connected. Its input and its
    /// processors at that time run ahead of this pipeline's processors.
    Upstream(Arc<Pipeline>),
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Root::Source(input) => f.debug_tuple("Source").field(&input.name()).finish(),
            Root::Upstream(p) => f.debug_tuple("Upstream").field(p).finish(),
        }
    }
}

/// An output together with the chain it was attached behind.
#[derive(Clone)]
pub struct OutputBinding {
    pub id: OutputId,
    pub name: String,
    pub output: Output,
    chain: ChainSnapshot,
}

impl OutputBinding {
    /// Processors upstream of this output, in declaration order.
    pub fn chain(&self) -> &[SharedSpec] {
        &self.chain
    }

    pub(crate) fn snapshot(&self) -> ChainSnapshot {
        self.chain.clone()
    }
}

impl fmt::Debug for OutputBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBinding")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("output", &self.output)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}

/// Snapshot of a pipeline's state, usable to rebuild an identical pipeline.
#[derive(Clone)]
pub struct PipelineState {
    pub input: Option<Root>,
    pub processors: ChainSnapshot,
    pub outputs: Arc<[OutputBinding]>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            input: None,
            processors: Arc::from(Vec::new()),
            outputs: Arc::from(Vec::new()),
        }
    }
}

/// Immutable, structurally shared description of a processing chain.
#[derive(Clone, Default)]
pub struct Pipeline {
    state: PipelineState,
}

impl Pipeline {
    /// Empty pipeline awaiting an input.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: PipelineState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn into_state(self) -> PipelineState {
        self.state
    }

    // ── Input ──

    /// Set the input. Fails when one is already set; see [`Pipeline::replace_input`].
    pub fn with_input(&self, input: impl Input + 'static) -> PipelineResult<Self> {
        self.with_root(Root::Source(Arc::new(input)))
    }

    pub fn with_shared_input(&self, input: SharedInput) -> PipelineResult<Self> {
        self.with_root(Root::Source(input))
    }

    /// Root this pipeline at `upstream` as it is now.
    pub fn with_upstream(&self, upstream: &Pipeline) -> PipelineResult<Self> {
        self.with_root(Root::Upstream(Arc::new(upstream.clone())))
    }

    /// Set the input, overwriting any existing one.
    pub fn replace_input(&self, input: impl Input + 'static) -> Self {
        self.derive(|state| state.input = Some(Root::Source(Arc::new(input))))
    }

    fn with_root(&self, root: Root) -> PipelineResult<Self> {
        if let Some(existing) = &self.state.input {
            return Err(PipelineError::Configuration(format!(
                "Pipeline already has an input ({:?}); use replace_input to overwrite it",
                existing
            )));
        }
        Ok(self.derive(|state| state.input = Some(root)))
    }

    pub fn input(&self) -> Option<&Root> {
        self.state.input.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.state.input.is_some()
    }

    // ── Processors ──

    /// Append a processor. Compatibility with the previous step is not checked.
    pub fn add_processor(&self, spec: impl ProcessorSpec + 'static) -> Self {
        self.add_shared(Arc::new(spec))
    }

    pub fn add_shared(&self, spec: SharedSpec) -> Self {
        self.derive(|state| {
            let mut processors = state.processors.to_vec();
            processors.push(spec);
            state.processors = processors.into();
        })
    }

    /// Read-only view of the processors, in execution order.
    pub fn processors(&self) -> &[SharedSpec] {
        &self.state.processors
    }

    pub fn filter(&self, predicate: impl Fn(&Event) -> bool + Send + Sync + 'static) -> Self {
        self.add_processor(FilterSpec::new(predicate))
    }

    pub fn map(&self, func: impl Fn(Event) -> Event + Send + Sync + 'static) -> Self {
        self.add_processor(MapSpec::infallible(func))
    }

    pub fn select<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_processor(SelectSpec::new(fields))
    }

    pub fn take(&self, limit: usize) -> Self {
        self.add_processor(TakeSpec::new(limit))
    }

    // ── Outputs ──

    /// Attach a named output behind the processors added so far.
    pub fn attach_output(&self, name: impl Into<String>, output: Output) -> Self {
        let name = name.into();
        self.derive(|state| {
            let binding = OutputBinding {
                id: OutputId(state.outputs.len() as u32),
                name,
                output,
                chain: state.processors.clone(),
            };
            let mut outputs = state.outputs.to_vec();
            outputs.push(binding);
            state.outputs = outputs.into();
        })
    }

    pub fn outputs(&self) -> &[OutputBinding] {
        &self.state.outputs
    }

    pub fn output(&self, id: OutputId) -> Option<&OutputBinding> {
        self.state.outputs.get(id.index())
    }

    /// Every binding registered under `name`.
    pub fn outputs_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OutputBinding> {
        self.state.outputs.iter().filter(move |b| b.name == name)
    }

    fn derive(&self, f: impl FnOnce(&mut PipelineState)) -> Self {
        let mut state = self.state.clone();
        f(&mut state);
        Self { state }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.state.processors.iter().map(|p| p.name()).collect();
        f.debug_struct("Pipeline")
            .field("input", &self.state.input)
            .field("processors", &names)
            .field("outputs", &self.state.outputs.len())
            .finish()
    }
}
