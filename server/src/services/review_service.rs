// server/src/services/review_service.rs

use tracing::{info, instrument};

use crate::errors::{AppError, ErrorCode, Result};
use crate::models::{NewReview, Review};
use crate::store::ShopStore;

pub const COMMENT_MAX_LEN: usize = 500;

/// Checks the rating range and returns the trimmed comment.
pub fn validate_review(rating: Option<f64>, comment: Option<&str>) -> Result<(i32, String)> {
  let rating = match rating {
    Some(r) if r.fract() == 0.0 && (1.0..=5.0).contains(&r) => r as i32,
    _ => {
      return Err(AppError::BadRequest {
        message: "Rating must be a whole number between 1 and 5".to_string(),
        code: ErrorCode::InvalidRating,
      })
    }
  };

  let comment = comment.map(str::trim).unwrap_or_default();
  if comment.is_empty() {
    return Err(AppError::missing_fields("A comment is required"));
  }
  if comment.chars().count() > COMMENT_MAX_LEN {
    return Err(AppError::BadRequest {
      message: format!("Comment is too long (max. {} characters)", COMMENT_MAX_LEN),
      code: ErrorCode::InvalidComment,
    });
  }
  Ok((rating, comment.to_string()))
}

#[instrument(name = "review_service::create", skip(store, comment), err(Display))]
pub async fn create_review(store: &dyn ShopStore, user_id: i64, rating: Option<f64>, comment: Option<&str>) -> Result<Review> {
  let (rating, comment) = validate_review(rating, comment)?;
  let review = store
    .insert_review(NewReview {
      user_id,
      rating,
      comment,
    })
    .await?;
  info!(review_id = review.id, user_id, rating, "Review created.");
  Ok(review)
}
