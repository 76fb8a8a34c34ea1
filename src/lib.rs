//! # pond-rs: time-series event pipelines
//!
//! Pipelines are declared as immutable values: an input, an ordered chain of
//! processors (filters, maps, scripts, windowed aggregators), and named
//! outputs. A `Runner` resolves one output back to the linear chain and input
//! it descends from, clones fresh processor instances, and streams events
//! through with strict per-event ordering.
//!
//! ## Architecture
//!
//! - **Pipeline**: immutable, structurally shared description
//! - **ChainResolver**: output → ordered processor specs + root input
//! - **Runner**: per-run processor instances, drain loop, flush protocol
//! - **Communication**: crossbeam channels for push inputs and channel outputs
//!
//! ## Example
//!
//! ```
//! use pond_rs::pipeline::nodes::{AggregateSpec, Reducer};
//! use pond_rs::pipeline::{BoundedInput, Output, Pipeline, Runner};
//! use pond_rs::Event;
//! use std::time::Duration;
//!
//! let events = vec![
//!     Event::at_millis(0).with("value", 1.0),
//!     Event::at_millis(500).with("value", 3.0),
//!     Event::at_millis(1_500).with("value", 10.0),
//! ];
//! let pipeline = Pipeline::new()
//!     .with_input(BoundedInput::new(events))?
//!     .add_processor(AggregateSpec::new(Duration::from_secs(1), "value", Reducer::Avg)?)
//!     .attach_output("out", Output::Collect);
//!
//! let mut runner = Runner::new(&pipeline, "out")?;
//! let results = runner.start(true)?;
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].get_f64("value"), Some(2.0));
//! # Ok::<(), pond_rs::pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types
pub use config::{EngineConfig, LoggingConfig, RunnerConfig};
pub use error::{PondError, Result};
pub use event::Event;
pub use pipeline::{Output, Pipeline, PipelineError, PipelineResult, Runner};
