// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::User;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::responses;
use pizzeria_flow::{ContextData, PipelineResult};

// --- Request DTOs ---
// Missing fields deserialize as empty strings so validation reports MISSING_FIELDS.

#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/// Rate limiter key. Only the socket peer is trusted; forwarding headers are ignored.
pub fn client_key(req: &HttpRequest) -> String {
  req
    .peer_addr()
    .map(|addr| addr.ip().to_string())
    .unwrap_or_else(|| "unknown".to_string())
}

// --- Handler Implementations ---

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(username = %req_payload.username))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let signup_ctx = SignupCtxData::new(
    app_state.get_ref().clone(),
    payload.username.trim().to_string(),
    normalize_email(&payload.email),
    payload.password,
  );
  let ctx_data = ContextData::new(signup_ctx);

  match app_state.pipelines.signup.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let user = ctx_data.read().created_user.clone().ok_or_else(|| {
        warn!("Signup pipeline completed without a created user in context.");
        AppError::Internal("Signup completed without creating a user.".to_string())
      })?;
      info!(user_id = user.id, "Registration successful.");
      Ok(responses::created("User registered successfully", user.public()))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signup pipeline was stopped by a step.");
      Err(AppError::Internal("Signup process was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Registration failed.");
      Err(app_err)
    }
  }
}

/// Runs the sign-in pipeline and settles the limiter reservation: client-side
/// failures count against the caller's key, successes and server errors do not.
async fn run_signin(
  app_state: &web::Data<AppState>,
  req: &HttpRequest,
  payload: LoginRequestPayload,
  admin_only: bool,
) -> Result<SigninCtxData, AppError> {
  let key = client_key(req);
  let signin_ctx = SigninCtxData::new(
    app_state.get_ref().clone(),
    normalize_email(&payload.email),
    payload.password,
    key.clone(),
    admin_only,
  );
  let ctx_data = ContextData::new(signin_ctx);

  let outcome = match app_state.pipelines.signin.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => Ok(ctx_data.read().clone()),
    Ok(PipelineResult::Stopped) => {
      warn!("Signin pipeline was stopped by a step.");
      Err(AppError::Internal("Authentication process was unexpectedly halted.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, client = %key, "Sign-in failed.");
      Err(app_err)
    }
  };

  // A refused attempt never reserved anything; every other attempt is settled here.
  if ctx_data.read().attempt_reserved {
    let failed = matches!(&outcome, Err(err) if actix_web::ResponseError::status_code(err).is_client_error());
    app_state.login_limiter.finish_attempt(&key, failed);
  }
  outcome
}

fn session_parts(ctx: SigninCtxData) -> Result<(User, String), AppError> {
  let user = ctx
    .user
    .ok_or_else(|| AppError::Internal("Signin completed without a user.".to_string()))?;
  let token = ctx
    .session_token
    .ok_or_else(|| AppError::Internal("Signin completed without a session token.".to_string()))?;
  Ok((user, token))
}

#[instrument(name = "handler::login", skip_all)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = run_signin(&app_state, &req, req_payload.into_inner(), false).await?;
  let (user, token) = session_parts(ctx)?;
  info!(user_id = user.id, "Login successful.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Login successful",
      "token": token,
      "user": user.public(),
  })))
}

#[instrument(name = "handler::admin_login", skip_all)]
pub async fn admin_login_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = run_signin(&app_state, &req, req_payload.into_inner(), true).await?;
  let (user, token) = session_parts(ctx)?;
  info!(target: "admin_audit", user_id = user.id, "Administrator signed in.");

  Ok(responses::ok(
    "Admin login successful",
    json!({
        "token": token,
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "role": user.role,
        },
    }),
  ))
}
