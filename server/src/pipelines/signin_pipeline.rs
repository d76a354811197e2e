// server/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service::{self, HashCost};
use crate::validation;
use pizzeria_flow::{ContextData, Pipeline, PipelineControl};
use tracing::{event, info, instrument, warn, Level};

/// Shared by `/api/login` and `/admin/login`; `SigninCtxData::admin_only` tells them apart.
pub fn build_signin_pipeline() -> Pipeline<SigninCtxData, AppError> {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("check_rate_limit", false),
    ("validate_login", false),
    ("fetch_user_by_email", false),
    ("verify_password", false),
    ("check_role", false),
    ("issue_session_token", false),
  ]);

  signin_p.on_step("check_rate_limit", check_rate_limit_step);
  signin_p.on_step("validate_login", validate_login_step);
  signin_p.on_step("fetch_user_by_email", fetch_user_by_email_step);
  signin_p.on_step("verify_password", verify_password_step);
  signin_p.on_step("check_role", check_role_step);
  signin_p.on_step("issue_session_token", issue_session_token_step);
  signin_p
}

async fn check_rate_limit_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let (limiter, client_key) = {
    let guard = ctx_data.read();
    (guard.app_state.login_limiter.clone(), guard.client_key.clone())
  };
  limiter
    .begin_attempt(&client_key)
    .map_err(|retry_after_secs| AppError::TooManyRequests { retry_after_secs })?;
  ctx_data.write().attempt_reserved = true;
  Ok(PipelineControl::Continue)
}

async fn validate_login_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  {
    let guard = ctx_data.read();
    event!(Level::DEBUG, "Validating sign-in input.");
    validation::validate_login(&guard.email, &guard.password)?;
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "signin::fetch_user_by_email", skip_all, err(Display))]
async fn fetch_user_by_email_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let (store, email, password, cost) = {
    let guard = ctx_data.read();
    (
      guard.app_state.store.clone(),
      guard.email.clone(),
      guard.password.clone(),
      HashCost::from_config(&guard.app_state.config),
    )
  };

  match store.find_user_by_email(&email).await? {
    Some(user) => {
      event!(Level::DEBUG, user_id = user.id, "User found for sign-in.");
      ctx_data.write().user = Some(user);
      Ok(PipelineControl::Continue)
    }
    None => {
      // Same error and the same hashing work as a wrong password, so neither
      // the response nor its timing tells whether the account exists.
      auth_service::verify_decoy_blocking(password, cost).await?;
      warn!("Sign-in attempt for an unknown email.");
      Err(AppError::InvalidCredentials)
    }
  }
}

async fn verify_password_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let (stored_hash, password, user_id) = {
    let guard = ctx_data.read();
    let user = guard
      .user
      .as_ref()
      .ok_or_else(|| AppError::Internal("verify_password ran without a user".to_string()))?;
    (user.password_hash.clone(), guard.password.clone(), user.id)
  };

  if auth_service::verify_password_blocking(stored_hash, password).await? {
    Ok(PipelineControl::Continue)
  } else {
    warn!(user_id, "Sign-in attempt with a wrong password.");
    Err(AppError::InvalidCredentials)
  }
}

async fn check_role_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let guard = ctx_data.read();
  let is_admin = guard.user.as_ref().map(|u| u.is_admin()).unwrap_or(false);
  if guard.admin_only && !is_admin {
    warn!("Non-admin account tried to sign in to the admin panel.");
    return Err(AppError::Forbidden("Administrator access required".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn issue_session_token_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let token = {
    let guard = ctx_data.read();
    let user = guard
      .user
      .as_ref()
      .ok_or_else(|| AppError::Internal("issue_session_token ran without a user".to_string()))?;
    let tokens = &guard.app_state.tokens;
    let token = if guard.admin_only {
      tokens.issue_admin_token(user)?
    } else {
      tokens.issue_user_token(user)?
    };
    info!(user_id = user.id, admin_panel = guard.admin_only, "Session token issued.");
    token
  };
  ctx_data.write().session_token = Some(token);
  Ok(PipelineControl::Continue)
}
