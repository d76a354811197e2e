// server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::services::review_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::responses;

#[derive(Deserialize, Debug)]
pub struct CreateReviewPayload {
  #[serde(default)]
  pub rating: Option<f64>,
  #[serde(default)]
  pub comment: Option<String>,
}

#[instrument(name = "handler::list_reviews", skip(app_state))]
pub async fn list_reviews_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let reviews = app_state.store.list_reviews().await?;
  debug!(count = reviews.len(), "Listing reviews.");
  Ok(HttpResponse::Ok().json(reviews))
}

#[instrument(name = "handler::create_review", skip(app_state, req_payload, auth_user), fields(user_id = auth_user.user_id()))]
pub async fn create_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CreateReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let review = review_service::create_review(
    app_state.store.as_ref(),
    auth_user.user_id(),
    payload.rating,
    payload.comment.as_deref(),
  )
  .await?;

  Ok(responses::created(
    "Review created successfully",
    json!({
        "reviewId": review.id,
        "rating": review.rating,
        "comment": review.comment,
        "created_at": review.created_at,
    }),
  ))
}
