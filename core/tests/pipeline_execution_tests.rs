// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use pizzeria_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("step1", false), ("step2", false), ("step3", false)]);

  pipeline.on_step("step1", simple_handler("step1", " S1"));
  pipeline.on_step("step2", simple_handler("step2", " S2"));
  pipeline.on_step("step3", simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_multiple_handlers_on_one_step_run_in_registration_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("only", false)]);
  pipeline.on_step("only", simple_handler("first", "a"));
  pipeline.on_step("only", simple_handler("second", "b"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().message, "ab");
  assert_eq!(ctx.read().steps_executed, vec!["first", "second"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("stepA", false), ("stopStep", false), ("stepC", false)]);

  pipeline.on_step("stepA", simple_handler("stepA", "A"));
  pipeline.on_step("stopStep", |ctx: ContextData<TestContext>| async move {
    ctx.write().steps_executed.push("stopStep".to_string());
    Ok::<PipelineControl, FlowError>(PipelineControl::Stop)
  });
  pipeline.on_step("stepC", simple_handler("stepC", "C"));
  pipeline.compensate_step("stepA", recording_compensation("stepA"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.steps_executed, vec!["stepA", "stopStep"]);
  assert!(guard.compensations_run.is_empty(), "a graceful stop must not unwind");
}

#[tokio::test]
#[serial]
async fn test_stop_requested_through_context_field() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("one", false), ("two", false), ("three", false)]);
  pipeline.on_step("one", simple_handler("one", "1"));
  pipeline.on_step("two", simple_handler("two", "2"));
  pipeline.on_step("three", simple_handler("three", "3"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("two".to_string()),
    ..Default::default()
  });
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().message, "12");
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("good_step", false), ("bad_step", false), ("another_step", false)]);

  pipeline.on_step("good_step", simple_handler("good_step", "Good"));
  pipeline.on_step("bad_step", failing_handler("bad_step", "I am a bad step!"));
  pipeline.on_step("another_step", simple_handler("another_step", "NeverRun"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.message, "Good");
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("step1", false), ("maybe", true), ("step3", false)]);
  pipeline.on_step("step1", simple_handler("step1", " S1"));
  pipeline.on_step("step3", simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step3"]);
}

#[test]
fn test_step_names_keep_definition_order() {
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("b", false), ("a", true), ("c", false)]);
  assert_eq!(pipeline.step_names(), vec!["b", "a", "c"]);
}

#[test]
#[should_panic(expected = "step 'typo' not found")]
fn test_registering_handler_on_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("real", false)]);
  pipeline.on_step("typo", simple_handler("typo", ""));
}
