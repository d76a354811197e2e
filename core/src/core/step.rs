// core/src/core/step.rs

/// A named step. Optional steps without handlers are skipped instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}

impl StepDef {
  pub fn new(name: impl Into<String>, optional: bool) -> Self {
    Self {
      name: name.into(),
      optional,
    }
  }
}
