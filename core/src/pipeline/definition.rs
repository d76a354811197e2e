// core/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its construction.

use crate::core::context::{Compensation, Handler};
use crate::core::step::StepDef;
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered set of named steps over a shared context `TData`.
///
/// `Err` is the error type handlers return. It must absorb [`FlowError`] so that
/// setup problems found while running (a non-optional step without handlers)
/// surface through the same channel as handler failures.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) compensations: HashMap<String, Compensation<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(step_name, optional)` pairs, in execution order.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional)| StepDef::new(*name, *optional))
      .collect();

    Self {
      steps,
      on: HashMap::new(),
      compensations: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_compensation(&self, step_name: &str) -> bool {
    self.compensations.contains_key(step_name)
  }

  /// Panics when the step is unknown. A misspelt step name is a programming
  /// error found at startup, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "pipeline setup error: step '{}' not found in pipeline definition",
        step_name
      );
    }
  }
}
