// server/src/validation.rs

//! Shape checks for account input.
//!
//! Every check returns the first problem it finds as a [`ValidationError`]
//! carrying a human message and the [`ErrorCode`] the API reports. The
//! composite checks run their parts in a fixed order and stop at the first
//! failure, so callers always see one error at a time.

use crate::errors::ErrorCode;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const EMAIL_MAX_LEN: usize = 254;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
  )
  .expect("email pattern compiles")
});

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
  pub message: String,
  pub code: ErrorCode,
}

impl ValidationError {
  fn new(message: impl Into<String>, code: ErrorCode) -> Self {
    Self {
      message: message.into(),
      code,
    }
  }
}

pub type Validation = Result<(), ValidationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordMode {
  /// Presence only; the stored hash decides.
  Login,
  /// Full strength rules, all violations reported together.
  Registration,
}

pub fn validate_email(email: &str) -> Validation {
  if email.is_empty() {
    return Err(ValidationError::new("Email is required", ErrorCode::MissingFields));
  }
  if email.chars().count() > EMAIL_MAX_LEN {
    return Err(ValidationError::new(
      format!("Email address is too long (max. {} characters)", EMAIL_MAX_LEN),
      ErrorCode::InvalidEmail,
    ));
  }
  if !EMAIL_RE.is_match(email) {
    return Err(ValidationError::new("Invalid email address", ErrorCode::InvalidEmail));
  }
  Ok(())
}

pub fn validate_password(password: &str, mode: PasswordMode) -> Validation {
  if password.is_empty() {
    return Err(ValidationError::new("Password is required", ErrorCode::MissingFields));
  }
  if mode == PasswordMode::Login {
    return Ok(());
  }

  let len = password.chars().count();
  let mut problems = Vec::new();
  if len < PASSWORD_MIN_LEN {
    problems.push(format!("at least {} characters", PASSWORD_MIN_LEN));
  }
  if len > PASSWORD_MAX_LEN {
    problems.push(format!("at most {} characters", PASSWORD_MAX_LEN));
  }
  if !password.chars().any(|c| c.is_ascii_digit()) {
    problems.push("at least one digit (0-9)".to_string());
  }
  if !password.chars().any(|c| c.is_ascii_alphabetic()) {
    problems.push("at least one letter (a-z, A-Z)".to_string());
  }

  if problems.is_empty() {
    Ok(())
  } else {
    Err(ValidationError::new(
      format!("Password must have: {}", problems.join(", ")),
      ErrorCode::InvalidPassword,
    ))
  }
}

pub fn validate_username(username: &str) -> Validation {
  if username.is_empty() {
    return Err(ValidationError::new("Username is required", ErrorCode::MissingFields));
  }
  let len = username.chars().count();
  if len < USERNAME_MIN_LEN {
    return Err(ValidationError::new(
      format!("Username must be at least {} characters long", USERNAME_MIN_LEN),
      ErrorCode::InvalidUsername,
    ));
  }
  if len > USERNAME_MAX_LEN {
    return Err(ValidationError::new(
      format!("Username is too long (max. {} characters)", USERNAME_MAX_LEN),
      ErrorCode::InvalidUsername,
    ));
  }
  if !USERNAME_RE.is_match(username) {
    return Err(ValidationError::new(
      "Username may only contain letters, digits and underscores",
      ErrorCode::InvalidUsername,
    ));
  }
  Ok(())
}

/// username, then email, then password.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Validation {
  validate_username(username)?;
  validate_email(email)?;
  validate_password(password, PasswordMode::Registration)
}

/// email, then password presence.
pub fn validate_login(email: &str, password: &str) -> Validation {
  validate_email(email)?;
  validate_password(password, PasswordMode::Login)
}
