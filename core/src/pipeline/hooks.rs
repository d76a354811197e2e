// core/src/pipeline/hooks.rs

//! Registration of step handlers and compensating actions.

use crate::core::context::{Compensation, Handler};
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Appends a handler to `step_name`. Handlers of one step run in registration order.
  ///
  /// The handler's own error type only needs to convert into the pipeline's `Err`.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Sets the compensating action for `step_name`, replacing any earlier one.
  ///
  /// It runs only if the step completed and a later step failed.
  pub fn compensate_step<F, UserErr>(
    &mut self,
    step_name: &str,
    compensation_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensation: Compensation<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = compensation_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    if self
      .compensations
      .insert(step_name.to_string(), compensation)
      .is_some()
    {
      event!(Level::WARN, step_name, "Replaced an existing compensation.");
    }
  }
}
