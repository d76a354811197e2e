// tests/common/mod.rs
#![allow(dead_code)]

use pizzeria_flow::{ContextData, FlowError, PipelineControl};
use std::future::Future;
use std::pin::Pin;
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub compensations_run: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("test handler failed: {0}")]
  Handler(String),

  #[error("test compensation failed: {0}")]
  Compensation(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, TestError>> + Send>>;
type CompensationFuture = Pin<Box<dyn Future<Output = Result<(), TestError>> + Send>>;

pub fn simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> impl Fn(ContextData<TestContext>) -> HandlerFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> HandlerFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> HandlerFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> HandlerFuture {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = step_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  }
}

pub fn recording_compensation(
  step_name: &'static str,
) -> impl Fn(ContextData<TestContext>) -> CompensationFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> CompensationFuture {
    Box::pin(async move {
      ctx.write().compensations_run.push(step_name.to_string());
      Ok(())
    })
  }
}

pub fn failing_compensation(
  step_name: &'static str,
) -> impl Fn(ContextData<TestContext>) -> CompensationFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> CompensationFuture {
    Box::pin(async move {
      ctx.write().compensations_run.push(step_name.to_string());
      Err(TestError::Compensation(format!("{step_name} could not be undone")))
    })
  }
}

use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
