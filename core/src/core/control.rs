// core/src/core/control.rs

//! Flow signals returned by handlers and the outcome of a whole run.

/// Returned by a handler to keep going or to halt the run gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt after this handler. No compensation runs: stopping is not a failure.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran (or was skipped as optional with no handlers).
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
