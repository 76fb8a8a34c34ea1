use super::error::{PipelineError, PipelineResult};
use super::id::{OutputId, SpecId};
use super::input::SharedInput;
use super::node::SharedSpec;
use super::output::Output;
use super::pipeline::{ChainSnapshot, OutputBinding, Pipeline, Root};

/// Default upper bound on the number of processors in one resolved chain.
pub const DEFAULT_MAX_CHAIN_LEN: usize = 1024;

/// The linear chain feeding one output, in root-to-leaf order.
#[derive(Debug, Clone)]
pub struct ResolvedChain {
    pub input: SharedInput,
    pub specs: Vec<SharedSpec>,
    pub output: Output,
    pub output_id: OutputId,
    pub output_name: String,
}

impl ResolvedChain {
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn spec(&self, id: SpecId) -> Option<&SharedSpec> {
        self.specs.get(id.index())
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name()).collect()
    }
}

/// Resolves an output of a pipeline into the chain of specs and the root input.
pub struct ChainResolver {
    max_chain_len: usize,
}

impl ChainResolver {
    pub fn new(max_chain_len: usize) -> Self {
        Self { max_chain_len }
    }

    /// Resolve the output registered under `output_name`.
    ///
    /// # Errors
    /// * `Configuration` - no such output, or no input is reachable
    /// * `ChainResolution` - the name is bound more than once, or the chain
    ///   exceeds the configured maximum length
    pub fn resolve(&self, pipeline: &Pipeline, output_name: &str) -> PipelineResult<ResolvedChain> {
        let mut bindings = pipeline.outputs_named(output_name);
        let binding = bindings.next().ok_or_else(|| {
            PipelineError::Configuration(format!("Pipeline has no output named '{}'", output_name))
        })?;
        let extra = bindings.count();
        if extra > 0 {
            return Err(PipelineError::ChainResolution(format!(
                "Output '{}' is attached at {} points; its chain is ambiguous",
                output_name,
                extra + 1
            )));
        }
        self.resolve_binding(pipeline, binding)
    }

    /// Resolve an output by id.
    pub fn resolve_id(&self, pipeline: &Pipeline, id: OutputId) -> PipelineResult<ResolvedChain> {
        let binding = pipeline.output(id).ok_or_else(|| {
            PipelineError::Configuration(format!("Pipeline has no output {:?}", id))
        })?;
        self.resolve_binding(pipeline, binding)
    }

    fn resolve_binding(
        &self,
        pipeline: &Pipeline,
        binding: &OutputBinding,
    ) -> PipelineResult<ResolvedChain> {
        // Segments are collected leaf-first while walking toward the root.
        let mut segments: Vec<ChainSnapshot> = vec![binding.snapshot()];
        let mut current = pipeline;
        let input = loop {
            match current.input() {
                None => {
                    return Err(PipelineError::Configuration(format!(
                        "Unattached pipeline: no input reachable from output '{}'",
                        binding.name
                    )))
                }
                Some(Root::Source(input)) => break input.clone(),
                Some(Root::Upstream(upstream)) => {
                    segments.push(upstream.state().processors.clone());
                    current = upstream.as_ref();
                }
            }
        };

        let total: usize = segments.iter().map(|s| s.len()).sum();
        if total > self.max_chain_len {
            return Err(PipelineError::ChainResolution(format!(
                "Chain for output '{}' has {} processors (max {})",
                binding.name, total, self.max_chain_len
            )));
        }

        let mut specs = Vec::with_capacity(total);
        for segment in segments.iter().rev() {
            specs.extend(segment.iter().cloned());
        }

        tracing::debug!(
            "Resolved output '{}' to {} processors from input '{}'",
            binding.name,
            specs.len(),
            input.name()
        );

        Ok(ResolvedChain {
            input,
            specs,
            output: binding.output.clone(),
            output_id: binding.id,
            output_name: binding.name.clone(),
        })
    }
}

impl Default for ChainResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHAIN_LEN)
    }
}
