// server/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
  pub id: i64,
  pub user_id: i64,
  pub rating: i32,
  pub comment: String,
  pub created_at: DateTime<Utc>,
}

/// Review joined with its author, newest first in listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
  pub id: i64,
  pub user_id: i64,
  pub username: String,
  pub rating: i32,
  pub comment: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub user_id: i64,
  pub rating: i32,
  pub comment: String,
}
