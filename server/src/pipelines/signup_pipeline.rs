// server/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewUser, Role};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service::{self, HashCost};
use crate::validation;
use pizzeria_flow::{ContextData, Pipeline, PipelineControl};
use tracing::{event, info, instrument, warn, Level};

pub fn build_signup_pipeline() -> Pipeline<SignupCtxData, AppError> {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_registration", false),
    ("check_existing_account", false),
    ("hash_password", false),
    ("insert_user", false),
  ]);

  signup_p.on_step("validate_registration", validate_registration_step);
  signup_p.on_step("check_existing_account", check_existing_account_step);
  signup_p.on_step("hash_password", hash_password_step);
  signup_p.on_step("insert_user", insert_user_step);
  signup_p
}

async fn validate_registration_step(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  {
    let guard = ctx_data.read();
    event!(Level::DEBUG, username = %guard.username, "Validating registration input.");
    validation::validate_registration(&guard.username, &guard.email, &guard.password)?;
  }
  Ok(PipelineControl::Continue)
}

/// One OR lookup, then the matching row tells which field collided.
#[instrument(name = "signup::check_existing_account", skip_all, err(Display))]
async fn check_existing_account_step(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (store, email, username) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.email.clone(), guard.username.clone())
  };

  let matches = store.find_users_by_email_or_username(&email, &username).await?;
  if matches.iter().any(|u| u.email == email) {
    warn!("Registration attempt with an email that is already taken.");
    return Err(AppError::email_exists());
  }
  if matches.iter().any(|u| u.username == username) {
    warn!(%username, "Registration attempt with a username that is already taken.");
    return Err(AppError::username_exists());
  }
  Ok(PipelineControl::Continue)
}

async fn hash_password_step(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (password, cost) = {
    let guard = ctx_data.read();
    (guard.password.clone(), HashCost::from_config(&guard.app_state.config))
  };
  let hash = auth_service::hash_password_blocking(password, cost).await?;
  ctx_data.write().password_hash = Some(hash);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "signup::insert_user", skip_all, err(Display))]
async fn insert_user_step(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_user) = {
    let guard = ctx_data.read();
    let password_hash = guard
      .password_hash
      .clone()
      .ok_or_else(|| AppError::Internal("insert_user ran before hash_password".to_string()))?;
    (
      guard.app_state.store.clone(),
      NewUser {
        username: guard.username.clone(),
        email: guard.email.clone(),
        password_hash,
        role: Role::Customer,
      },
    )
  };

  // A concurrent registration can still win the unique index.
  let user = store.insert_user(new_user).await.map_err(AppError::from_identity_write)?;
  info!(user_id = user.id, username = %user.username, "User registered.");
  ctx_data.write().created_user = Some(user);
  Ok(PipelineControl::Continue)
}
