// core/src/core/context.rs

//! Boxed handler types stored by a pipeline.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

pub type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A step handler. It receives a clone of the run's `ContextData<TData>`, must drop
/// any lock guard before awaiting, and decides whether the run continues.
pub type Handler<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> BoxedFuture<Result<PipelineControl, Err>> + Send + Sync>;

/// Undo action for a completed step, run when a later step fails.
pub type Compensation<TData, Err> = Box<dyn Fn(ContextData<TData>) -> BoxedFuture<Result<(), Err>> + Send + Sync>;
