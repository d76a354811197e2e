// server/src/web/extractors.rs

//! Bearer-token extractors for protected routes.

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::services::token_service::Claims;
use crate::state::AppState;

/// Any signed-in account. Rejects requests without a valid, unexpired token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub claims: Claims,
}

impl AuthenticatedUser {
  pub fn user_id(&self) -> i64 {
    self.claims.user_id
  }
}

/// An account whose token carries the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser {
  pub claims: Claims,
}

impl AdminUser {
  pub fn user_id(&self) -> i64 {
    self.claims.user_id
  }
}

/// Token part of `Authorization: Bearer <token>`, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  let token = token.trim();
  (!token.is_empty()).then_some(token)
}

fn verified_claims(req: &HttpRequest) -> Result<Claims, AppError> {
  let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;
  let app_state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("AppState is not registered on the app".to_string()))?;
  app_state.tokens.verify(token)
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(verified_claims(req).map(|claims| AuthenticatedUser { claims }))
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = verified_claims(req).and_then(|claims| {
      if claims.is_admin() {
        Ok(AdminUser { claims })
      } else {
        warn!(user_id = claims.user_id, path = %req.path(), "Non-admin token used on an admin route.");
        Err(AppError::Forbidden("Administrator access required".to_string()))
      }
    });
    ready(result)
  }
}
