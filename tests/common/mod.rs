//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use pond_rs::pipeline::{BoundedInput, Output, Pipeline};
use pond_rs::Event;

/// Bounded input of `value` points, one per `(millis, value)` pair.
pub fn series(points: &[(i64, f64)]) -> BoundedInput {
    BoundedInput::new(
        points
            .iter()
            .map(|&(t, v)| Event::at_millis(t).with("value", v))
            .collect(),
    )
}

/// `n` events one millisecond apart, carrying their index under `seq`.
pub fn sequence(n: usize) -> BoundedInput {
    BoundedInput::new(
        (0..n)
            .map(|i| Event::at_millis(i as i64).with("seq", i as u64))
            .collect(),
    )
}

/// A pipeline rooted at `input` with no processors.
pub fn rooted(input: BoundedInput) -> Pipeline {
    Pipeline::new()
        .with_input(input)
        .expect("fresh pipeline accepts an input")
}

pub fn collect_to(pipeline: &Pipeline, name: &str) -> Pipeline {
    pipeline.attach_output(name, Output::Collect)
}

/// Values of `field` across `events`, in order.
pub fn column(events: &[Event], field: &str) -> Vec<Option<f64>> {
    events.iter().map(|e| e.get_f64(field)).collect()
}
