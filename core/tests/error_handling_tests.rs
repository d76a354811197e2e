// tests/error_handling_tests.rs
mod common;
use common::*;
use pizzeria_flow::{ContextData, FlowError, Pipeline, PipelineControl};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("missing", false)]);
  let ctx = ContextData::new(TestContext::default());
  match pipeline.run(ctx).await {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected TestError::Flow(HandlerMissing), got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_handler_missing_unwinds_completed_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("done", false), ("forgotten", false)]);
  pipeline.on_step("done", simple_handler("done", "D"));
  pipeline.compensate_step("done", recording_compensation("done"));

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().compensations_run, vec!["done"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_flow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new(&[("task", false)]);
  pipeline.on_step("task", |ctx: ContextData<TestContext>| async move {
    ctx.write().counter = 1;
    Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_ok());
  assert_eq!(ctx.read().counter, 1);

  let mut failing = Pipeline::<TestContext, FlowError>::new(&[("fail_task", false)]);
  failing.on_step("fail_task", |_ctx| async move {
    Err::<PipelineControl, _>(FlowError::from(anyhow::anyhow!("socket closed")))
  });
  match failing.run(ContextData::new(TestContext::default())).await {
    Err(FlowError::HandlerError { source }) => assert_eq!(source.to_string(), "socket closed"),
    other => panic!("Expected FlowError::HandlerError, got {:?}", other),
  }
}
