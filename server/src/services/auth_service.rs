// server/src/services/auth_service.rs

//! Password hashing and verification with Argon2id.
//!
//! Hashing cost is fixed by configuration. Verification takes its parameters
//! from the stored PHC string, so hashes made with an older cost keep working.
//! Stored hashes that are not Argon2 PHC strings (for example bcrypt rows from
//! an older database) never verify; those accounts have to reset their password.

use crate::config::AppConfig;
use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use tracing::{debug, error, instrument, warn};

static DECOY_HASH: OnceCell<String> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
  pub memory_kib: u32,
  pub iterations: u32,
}

impl HashCost {
  pub fn from_config(config: &AppConfig) -> Self {
    Self {
      memory_kib: config.password_hash_memory_kib,
      iterations: config.password_hash_iterations,
    }
  }

  fn hasher(&self) -> Result<Argon2<'static>, AppError> {
    let params = Params::new(self.memory_kib, self.iterations, 1, None)
      .map_err(|e| AppError::Config(format!("Invalid password hashing parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
  }
}

#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str, cost: HashCost) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Internal("Refusing to hash an empty password.".to_string()));
  }
  let salt = SaltString::generate(&mut OsRng);
  match cost.hasher()?.hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// A hash of a throwaway password at the configured cost, made once per process.
///
/// Sign-in verifies against it when the email is unknown, so that branch costs
/// as much as a wrong password.
pub fn decoy_hash(cost: HashCost) -> Result<&'static str, AppError> {
  DECOY_HASH
    .get_or_try_init(|| hash_password("decoy-password-never-issued", cost))
    .map(String::as_str)
}

/// `Ok(false)` on a mismatch or a stored hash that is not an Argon2 PHC string.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = match PasswordHash::new(stored_hash) {
    Ok(parsed) => parsed,
    Err(parse_err) => {
      warn!(error = %parse_err, "Stored password hash is not a PHC string; treating as a mismatch.");
      return Ok(false);
    }
  };
  if Algorithm::try_from(parsed_hash.algorithm).is_err() {
    warn!(algorithm = %parsed_hash.algorithm, "Stored password hash uses a foreign algorithm; treating as a mismatch.");
    return Ok(false);
  }

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification encountered an error.");
      Err(AppError::Internal(format!("Password verification process failed: {}", other)))
    }
  }
}

/// [`hash_password`] on actix's blocking pool.
pub async fn hash_password_blocking(password: String, cost: HashCost) -> Result<String, AppError> {
  actix_web::web::block(move || hash_password(&password, cost))
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// [`verify_password`] on actix's blocking pool.
pub async fn verify_password_blocking(stored_hash: String, provided_password: String) -> Result<bool, AppError> {
  actix_web::web::block(move || verify_password(&stored_hash, &provided_password))
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}

/// Verifies `provided_password` against [`decoy_hash`] on actix's blocking pool.
pub async fn verify_decoy_blocking(provided_password: String, cost: HashCost) -> Result<bool, AppError> {
  actix_web::web::block(move || verify_password(decoy_hash(cost)?, &provided_password))
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}
