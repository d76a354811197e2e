// server/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use pizzeria_flow::FlowError;

use crate::store::StoreError;
use crate::validation::ValidationError;

/// Stable, machine-readable error codes sent as `errorCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
  MissingFields,
  InvalidEmail,
  InvalidPassword,
  InvalidUsername,
  InvalidRating,
  InvalidComment,
  InvalidQuantity,
  InvalidRequest,
  PriceMismatch,
  InvalidCredentials,
  TokenExpired,
  TokenInvalid,
  AccessDenied,
  EmailExists,
  UsernameExists,
  NotFound,
  AlreadyCancelled,
  OrderNotCancellable,
  OrderNotCancelled,
  NotFoundOrAlreadyHandled,
  TooManyRequests,
  DatabaseError,
  InternalError,
}

impl ErrorCode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorCode::MissingFields => "MISSING_FIELDS",
      ErrorCode::InvalidEmail => "INVALID_EMAIL",
      ErrorCode::InvalidPassword => "INVALID_PASSWORD",
      ErrorCode::InvalidUsername => "INVALID_USERNAME",
      ErrorCode::InvalidRating => "INVALID_RATING",
      ErrorCode::InvalidComment => "INVALID_COMMENT",
      ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
      ErrorCode::InvalidRequest => "INVALID_REQUEST",
      ErrorCode::PriceMismatch => "PRICE_MISMATCH",
      ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
      ErrorCode::TokenExpired => "TOKEN_EXPIRED",
      ErrorCode::TokenInvalid => "TOKEN_INVALID",
      ErrorCode::AccessDenied => "ACCESS_DENIED",
      ErrorCode::EmailExists => "EMAIL_EXISTS",
      ErrorCode::UsernameExists => "USERNAME_EXISTS",
      ErrorCode::NotFound => "NOT_FOUND",
      ErrorCode::AlreadyCancelled => "ALREADY_CANCELLED",
      ErrorCode::OrderNotCancellable => "ORDER_NOT_CANCELLABLE",
      ErrorCode::OrderNotCancelled => "ORDER_NOT_CANCELLED",
      ErrorCode::NotFoundOrAlreadyHandled => "NOT_FOUND_OR_ALREADY_HANDLED",
      ErrorCode::TooManyRequests => "TOO_MANY_REQUESTS",
      ErrorCode::DatabaseError => "DATABASE_ERROR",
      ErrorCode::InternalError => "INTERNAL_ERROR",
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  /// Shape errors on registration/login payloads (422).
  #[error("Validation Error: {0}")]
  Validation(#[from] ValidationError),

  /// Any other rejected client input (400).
  #[error("Bad Request: {message}")]
  BadRequest { message: String, code: ErrorCode },

  #[error("Price mismatch: {0}")]
  PriceMismatch(String),

  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("Too many login attempts; retry in {retry_after_secs}s")]
  TooManyRequests { retry_after_secs: u64 },

  /// No bearer token on a protected route.
  #[error("Authentication required: {0}")]
  Unauthorized(String),

  #[error("Session token has expired")]
  TokenExpired,

  #[error("Session token is invalid")]
  TokenInvalid,

  /// Ownership mismatch, missing admin role, or a protected account.
  #[error("Access denied: {0}")]
  Forbidden(String),

  #[error("Conflict: {message}")]
  Conflict { message: String, code: ErrorCode },

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Order {0} is already cancelled")]
  AlreadyCancelled(i64),

  #[error("Order {order_id} cannot be cancelled in status '{status}'")]
  OrderNotCancellable { order_id: i64, status: String },

  #[error("Order {0} must be cancelled before it can be deleted")]
  OrderNotCancelled(i64),

  #[error("Order {0} does not exist or is no longer pending")]
  NotFoundOrAlreadyHandled(i64),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Database(#[from] StoreError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(format!("{:#}", err))
  }
}

impl AppError {
  pub fn missing_fields(message: impl Into<String>) -> Self {
    AppError::BadRequest {
      message: message.into(),
      code: ErrorCode::MissingFields,
    }
  }

  pub fn email_exists() -> Self {
    AppError::Conflict {
      message: "This email address is already in use".to_string(),
      code: ErrorCode::EmailExists,
    }
  }

  pub fn username_exists() -> Self {
    AppError::Conflict {
      message: "This username already exists".to_string(),
      code: ErrorCode::UsernameExists,
    }
  }

  /// Like `From<StoreError>`, but turns unique violations on user identity into conflicts.
  pub fn from_identity_write(err: StoreError) -> Self {
    match err {
      StoreError::UniqueViolation { field } if field == "email" => AppError::email_exists(),
      StoreError::UniqueViolation { field } if field == "username" => AppError::username_exists(),
      other => AppError::Database(other),
    }
  }

  pub fn code(&self) -> ErrorCode {
    match self {
      AppError::Validation(v) => v.code,
      AppError::BadRequest { code, .. } | AppError::Conflict { code, .. } => *code,
      AppError::PriceMismatch(_) => ErrorCode::PriceMismatch,
      AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
      AppError::TooManyRequests { .. } => ErrorCode::TooManyRequests,
      AppError::Unauthorized(_) | AppError::Forbidden(_) => ErrorCode::AccessDenied,
      AppError::TokenExpired => ErrorCode::TokenExpired,
      AppError::TokenInvalid => ErrorCode::TokenInvalid,
      AppError::NotFound(_) => ErrorCode::NotFound,
      AppError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
      AppError::OrderNotCancellable { .. } => ErrorCode::OrderNotCancellable,
      AppError::OrderNotCancelled(_) => ErrorCode::OrderNotCancelled,
      AppError::NotFoundOrAlreadyHandled(_) => ErrorCode::NotFoundOrAlreadyHandled,
      AppError::Database(_) => ErrorCode::DatabaseError,
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => ErrorCode::InternalError,
    }
  }

  /// Message shown to the caller. Server-side failures get a generic text;
  /// the real cause only goes to the log.
  pub fn public_message(&self) -> String {
    match self {
      AppError::Validation(v) => v.message.clone(),
      AppError::BadRequest { message, .. } | AppError::Conflict { message, .. } => message.clone(),
      AppError::Database(_) => "A database error occurred.".to_string(),
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        "An internal error occurred.".to_string()
      }
      other => other.to_string(),
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
  pub success: bool,
  pub error: String,
  pub error_code: ErrorCode,
  pub timestamp: String,
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::PriceMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::BadRequest { .. }
      | AppError::AlreadyCancelled(_)
      | AppError::OrderNotCancellable { .. }
      | AppError::OrderNotCancelled(_) => StatusCode::BAD_REQUEST,
      AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::TokenExpired | AppError::TokenInvalid | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::Conflict { .. } => StatusCode::CONFLICT,
      AppError::NotFound(_) | AppError::NotFoundOrAlreadyHandled(_) => StatusCode::NOT_FOUND,
      AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
      AppError::Config(_) | AppError::Database(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::debug!(application_error = %self, code = self.code().as_str(), "Responding with client error");
    }

    let mut builder = HttpResponse::build(status);
    if let AppError::TooManyRequests { retry_after_secs } = self {
      builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
    }
    builder.json(ErrorEnvelope {
      success: false,
      error: self.public_message(),
      error_code: self.code(),
      timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
