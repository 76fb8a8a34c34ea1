//! ScriptNode: per-event Rhai expressions.
//!
//! ## Scope
//!
//! Every data field with a scalar value is pushed into the script scope
//! under its own name (numbers as `f64`, booleans, strings), along with:
//! - `time_ms` - the event timestamp in milliseconds since the epoch
//!
//! The value the script evaluates to is written to the output field. A
//! script that evaluates to `()` or to a non-scalar is a processing error.
//!
//! The script is compiled once when the spec is built; each instance owns its
//! own engine so runs never share interpreter state.

use crate::event::Event;
use crate::pipeline::error::{NodeError, PipelineError, PipelineResult};
use crate::pipeline::node::{AnyProcessor, BuiltinProcessor, NodeContext, ProcessorSpec};
use rhai::{Dynamic, Engine, Scope, AST};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Spec for a scripted map step.
#[derive(Clone)]
pub struct ScriptSpec {
    label: String,
    source: String,
    ast: Arc<AST>,
    output_field: String,
}

impl ScriptSpec {
    /// Compile `source`; the result of each evaluation lands in `output_field`.
    pub fn new(source: impl Into<String>, output_field: impl Into<String>) -> PipelineResult<Self> {
        let source = source.into();
        let output_field = output_field.into();
        let ast = build_engine()
            .compile(&source)
            .map_err(|e| PipelineError::Script(format!("Compilation error: {}", e)))?;
        Ok(Self {
            label: format!("Script({})", output_field),
            source,
            ast: Arc::new(ast),
            output_field,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for ScriptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptSpec")
            .field("source", &self.source)
            .field("output_field", &self.output_field)
            .finish()
    }
}

impl ProcessorSpec for ScriptSpec {
    fn name(&self) -> &str {
        &self.label
    }

    fn instantiate(&self) -> PipelineResult<AnyProcessor> {
        Ok(AnyProcessor::Builtin(BuiltinProcessor::Script(ScriptNode {
            label: self.label.clone(),
            engine: build_engine(),
            ast: self.ast.clone(),
            output_field: self.output_field.clone(),
        })))
    }
}

/// Engine with the safety limits every script runs under.
fn build_engine() -> Engine {
    let mut engine = Engine::new();
    engine.set_max_expr_depths(64, 64);
    engine.set_max_call_levels(32);
    engine.set_max_operations(10_000);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(1_000);
    engine.set_max_map_size(1_000);
    engine
}

pub struct ScriptNode {
    label: String,
    engine: Engine,
    ast: Arc<AST>,
    output_field: String,
}

impl ScriptNode {
    pub fn name(&self) -> &str {
        &self.label
    }

    pub fn on_event(&mut self, mut event: Event, ctx: &mut NodeContext) -> Result<(), NodeError> {
        let mut scope = Scope::new();
        scope.push("time_ms", event.timestamp_millis());
        for (key, value) in &event.data {
            match value {
                Value::Number(n) => {
                    if let Some(f) = n.as_f64() {
                        scope.push(key.clone(), f);
                    }
                }
                Value::Bool(b) => {
                    scope.push(key.clone(), *b);
                }
                Value::String(s) => {
                    scope.push(key.clone(), s.clone());
                }
                _ => {}
            }
        }

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast)
            .map_err(|e| format!("Execution error: {}", e))?;

        event.set(self.output_field.clone(), dynamic_to_json(result)?);
        ctx.emit(event);
        Ok(())
    }
}

fn dynamic_to_json(value: Dynamic) -> Result<Value, NodeError> {
    if let Ok(f) = value.as_float() {
        Ok(Value::from(f))
    } else if let Ok(i) = value.as_int() {
        Ok(Value::from(i))
    } else if let Ok(b) = value.as_bool() {
        Ok(Value::from(b))
    } else if value.is_string() {
        Ok(Value::from(value.into_string()?))
    } else {
        Err(format!("Script must return a scalar value, got {}", value.type_name()).into())
    }
}
