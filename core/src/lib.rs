// src/lib.rs

//! pizzeria-flow: async step pipelines with compensating actions.
//!
//! A pipeline is an ordered list of named steps that share one context value
//! wrapped in [`ContextData`]. Each step has one or more async handlers which
//! may let the run continue, stop it early, or fail it. A step may also carry
//! a compensating action: when a later step fails, the compensations of every
//! step that already completed run in reverse order before the error is
//! returned to the caller. This is how the order workflow undoes a written
//! order row when its line items cannot be stored.
//!
//! ```text
//!   validate ──► price ──► insert_order ──► insert_items
//!                              ▲                 │ fails
//!                              └── compensation ◄┘
//! ```

pub mod core;
pub mod error;
pub mod pipeline;

pub use crate::core::context::{Compensation, Handler};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::StepDef;
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::definition::Pipeline;
