// server/src/services/token_service.rs

//! Signed session tokens (HS256 JWT).

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Role, User};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
  pub user_id: i64,
  pub email: String,
  pub username: String,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

impl Claims {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

pub struct TokenService {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
  user_ttl: Duration,
  admin_ttl: Duration,
}

impl TokenService {
  pub fn new(secret: &str, user_ttl: Duration, admin_ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      user_ttl,
      admin_ttl,
    }
  }

  pub fn from_config(config: &AppConfig) -> Self {
    Self::new(&config.jwt_secret, config.token_ttl, config.admin_token_ttl)
  }

  /// Storefront token, valid for the user TTL.
  pub fn issue_user_token(&self, user: &User) -> Result<String, AppError> {
    self.issue_at(user, Utc::now().timestamp(), self.user_ttl)
  }

  /// Admin panel token, valid for the longer admin TTL.
  pub fn issue_admin_token(&self, user: &User) -> Result<String, AppError> {
    self.issue_at(user, Utc::now().timestamp(), self.admin_ttl)
  }

  #[instrument(name = "TokenService::issue", skip(self, user), fields(user_id = user.id), err(Display))]
  pub fn issue_at(&self, user: &User, issued_at: i64, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims {
      user_id: user.id,
      email: user.email.clone(),
      username: user.username.clone(),
      role: user.role,
      iat: issued_at,
      exp: issued_at + ttl.as_secs() as i64,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| AppError::Internal(format!("Could not sign session token: {}", e)))
  }

  /// Expired tokens map to `TokenExpired`; every other failure to `TokenInvalid`.
  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    match decode::<Claims>(token, &self.decoding, &self.validation) {
      Ok(data) => Ok(data.claims),
      Err(err) => {
        debug!(error = %err, "Session token rejected.");
        match err.kind() {
          ErrorKind::ExpiredSignature => Err(AppError::TokenExpired),
          _ => Err(AppError::TokenInvalid),
        }
      }
    }
  }
}
