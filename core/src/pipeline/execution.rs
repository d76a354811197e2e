// core/src/pipeline/execution.rs

//! `Pipeline::run()`: runs steps in order and unwinds completed steps on failure.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// On a handler error, compensations of the steps that already completed run
  /// newest first, then the original error is returned. A compensation that
  /// fails is logged and the unwinding carries on with the next one.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
          let err = Err::from(FlowError::HandlerMissing {
            step_name: step_def.name.clone(),
          });
          self.unwind(&completed, ctx_data.clone()).await;
          return Err(err);
        }
      };

      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        let outcome = handler_fn(ctx_data.clone())
          .instrument(span!(parent: &step_span, Level::DEBUG, "on_handler", handler_index = handler_idx))
          .await;
        match outcome {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(parent: &step_span, Level::INFO, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(parent: &step_span, Level::WARN, error = %e, "Handler failed.");
            self.unwind(&completed, ctx_data.clone()).await;
            return Err(e);
          }
        }
      }

      completed.push(step_name);
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }

  async fn unwind(&self, completed: &[&str], ctx_data: ContextData<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensation) = self.compensations.get(*step_name) else {
        continue;
      };
      event!(Level::INFO, step_name, "Running compensation.");
      if let Err(e) = compensation(ctx_data.clone()).await {
        event!(Level::ERROR, step_name, error = %e, "Compensation failed; continuing to unwind.");
      }
    }
  }
}
