//! Integration tests for pipeline construction and chain resolution.

mod common;

use common::builders::TagSpec;
use common::{collect_to, rooted, series};
use pond_rs::config::RunnerConfig;
use pond_rs::pipeline::{
    run, ChainResolver, Output, Pipeline, PipelineError, Runner, RunnerState,
};
use proptest::prelude::*;
use serde_json::Value;

fn trail(pipeline: &Pipeline, output: &str) -> Vec<Option<String>> {
    run(pipeline, output, false)
        .unwrap()
        .iter()
        .map(|e| e.get("trail").and_then(Value::as_str).map(str::to_string))
        .collect()
}

#[test]
fn test_outputs_freeze_processors_at_attach_time() {
    let base = rooted(series(&[(0, 1.0)])).add_processor(TagSpec::new("a"));
    let early = collect_to(&base, "early");
    let late = collect_to(&early.add_processor(TagSpec::new("b")), "late");

    assert_eq!(trail(&late, "early"), vec![Some("a".to_string())]);
    assert_eq!(trail(&late, "late"), vec![Some("a>b".to_string())]);

    let resolver = ChainResolver::default();
    assert_eq!(resolver.resolve(&late, "early").unwrap().names(), ["a"]);
    assert_eq!(resolver.resolve(&late, "late").unwrap().names(), ["a", "b"]);
}

#[test]
fn test_derivation_leaves_original_untouched() {
    let base = collect_to(&rooted(series(&[(0, 1.0)])), "out");
    let derived = base.add_processor(TagSpec::new("x"));

    assert!(base.processors().is_empty());
    assert_eq!(derived.processors().len(), 1);
    assert_eq!(trail(&base, "out"), vec![None]);
}

#[test]
fn test_upstream_processors_are_prepended() {
    let upstream = rooted(series(&[(0, 1.0), (1, 2.0)]))
        .add_processor(TagSpec::new("u1"))
        .add_processor(TagSpec::new("u2"));
    let downstream = Pipeline::new()
        .with_upstream(&upstream)
        .unwrap()
        .add_processor(TagSpec::new("d"))
        .attach_output("out", Output::Collect);

    // Later changes to the upstream are not seen by the downstream pipeline.
    let _changed = upstream.add_processor(TagSpec::new("ignored"));

    assert_eq!(
        trail(&downstream, "out"),
        vec![Some("u1>u2>d".to_string()), Some("u1>u2>d".to_string())]
    );
}

#[test]
fn test_unattached_pipeline_fails_before_running() {
    let spec = TagSpec::new("t");
    let pipeline = Pipeline::new()
        .add_processor(spec.clone())
        .attach_output("out", Output::Collect);

    let err = Runner::new(&pipeline, "out").err().unwrap();
    assert!(matches!(err, PipelineError::Configuration(_)));
    assert!(err.is_resolution());
    assert_eq!(spec.instances(), 0);
}

#[test]
fn test_unattached_upstream_fails() {
    let upstream = Pipeline::new().add_processor(TagSpec::new("u"));
    let downstream = collect_to(&Pipeline::new().with_upstream(&upstream).unwrap(), "out");
    let err = Runner::new(&downstream, "out").err().unwrap();
    assert!(matches!(err, PipelineError::Configuration(_)));
}

#[test]
fn test_unknown_output() {
    let pipeline = collect_to(&rooted(series(&[])), "out");
    let err = Runner::new(&pipeline, "missing").err().unwrap();
    assert!(matches!(err, PipelineError::Configuration(_)));
}

#[test]
fn test_output_bound_twice_is_ambiguous() {
    let base = rooted(series(&[(0, 1.0)]));
    let pipeline = collect_to(&collect_to(&base, "out").add_processor(TagSpec::new("t")), "out");
    let err = Runner::new(&pipeline, "out").err().unwrap();
    assert!(matches!(err, PipelineError::ChainResolution(_)));
}

#[test]
fn test_chain_length_limit() {
    let mut pipeline = rooted(series(&[(0, 1.0)]));
    for i in 0..5 {
        pipeline = pipeline.add_processor(TagSpec::new(&format!("t{}", i)));
    }
    let pipeline = collect_to(&pipeline, "out");
    let config = RunnerConfig {
        max_chain_len: 4,
        ..RunnerConfig::default()
    };

    let err = Runner::with_config(&pipeline, "out", config).err().unwrap();
    assert!(matches!(err, PipelineError::ChainResolution(_)));

    let runner = Runner::new(&pipeline, "out").unwrap();
    assert_eq!(runner.state(), RunnerState::Created);
    assert_eq!(runner.resolved().len(), 5);
}

#[test]
fn test_second_input_rejected() {
    let pipeline = rooted(series(&[]));
    let err = pipeline.with_input(series(&[])).unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));

    let replaced = pipeline.replace_input(series(&[(0, 1.0)]).named("replacement"));
    let resolved = ChainResolver::default()
        .resolve(&collect_to(&replaced, "out"), "out")
        .unwrap();
    assert_eq!(resolved.input.name(), "replacement");
}

proptest! {
    #[test]
    fn prop_resolved_chain_is_prefix_at_attach(total in 0usize..8, attach_at in 0usize..8) {
        let attach_at = attach_at.min(total);
        let mut pipeline = rooted(series(&[(0, 1.0)]));
        for i in 0..total {
            if i == attach_at {
                pipeline = collect_to(&pipeline, "out");
            }
            pipeline = pipeline.add_processor(TagSpec::new(&format!("p{}", i)));
        }
        if attach_at == total {
            pipeline = collect_to(&pipeline, "out");
        }

        let expected: Vec<String> = (0..attach_at).map(|i| format!("p{}", i)).collect();
        let resolved = ChainResolver::default().resolve(&pipeline, "out").unwrap();
        prop_assert_eq!(resolved.names(), expected.iter().map(String::as_str).collect::<Vec<_>>());

        let expected_trail = if expected.is_empty() { None } else { Some(expected.join(">")) };
        prop_assert_eq!(trail(&pipeline, "out"), vec![expected_trail]);
    }
}
