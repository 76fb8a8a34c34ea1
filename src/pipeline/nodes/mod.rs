//! Built-in processor implementations.

pub mod aggregate;
pub mod filter;
pub mod map;
pub mod passthrough;
pub mod script;
pub mod take;

pub use aggregate::{AggregateSpec, AggregatorNode, Reducer};
pub use filter::{FilterNode, FilterSpec, Predicate};
pub use map::{MapFn, MapNode, MapSpec, SelectNode, SelectSpec};
pub use passthrough::{PassthroughNode, PassthroughSpec};
pub use script::{ScriptNode, ScriptSpec};
pub use take::{TakeNode, TakeSpec};
