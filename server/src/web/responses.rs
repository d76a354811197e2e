// server/src/web/responses.rs

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// `{success: true, message, data, timestamp}`, the counterpart of `ErrorEnvelope`.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T: Serialize> {
  pub success: bool,
  pub message: String,
  pub data: T,
  pub timestamp: String,
}

impl<T: Serialize> SuccessEnvelope<T> {
  pub fn new(message: impl Into<String>, data: T) -> Self {
    Self {
      success: true,
      message: message.into(),
      data,
      timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
  }
}

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
  with_status(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
  with_status(StatusCode::CREATED, message, data)
}

fn with_status<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> HttpResponse {
  HttpResponse::build(status).json(SuccessEnvelope::new(message, data))
}
