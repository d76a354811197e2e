// server/src/pipelines/mod.rs

//! Multi-step workflows built on `pizzeria_flow`.
//!
//! Pipelines are built once at startup and shared through `AppState`; each
//! request runs them against its own context.

use crate::errors::AppError;
use pizzeria_flow::Pipeline;

pub mod contexts;
pub mod place_order_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

use contexts::{PlaceOrderCtxData, SigninCtxData, SignupCtxData};

pub struct PipelineSet {
  pub signup: Pipeline<SignupCtxData, AppError>,
  pub signin: Pipeline<SigninCtxData, AppError>,
  pub place_order: Pipeline<PlaceOrderCtxData, AppError>,
}

impl PipelineSet {
  pub fn build() -> Self {
    let set = Self {
      signup: signup_pipeline::build_signup_pipeline(),
      signin: signin_pipeline::build_signin_pipeline(),
      place_order: place_order_pipeline::build_place_order_pipeline(),
    };
    tracing::info!(
      signup_steps = set.signup.step_names().len(),
      signin_steps = set.signin.step_names().len(),
      place_order_steps = set.place_order.step_names().len(),
      "Pipelines built."
    );
    set
  }
}
