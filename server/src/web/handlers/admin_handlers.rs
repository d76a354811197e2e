// server/src/web/handlers/admin_handlers.rs

//! `/admin/*` moderation endpoints. Every handler takes an [`AdminUser`], so a
//! request without an admin token never reaches the store.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::{admin_service, order_service};
use crate::state::AppState;
use crate::web::extractors::AdminUser;
use crate::web::responses;

#[derive(Deserialize, Debug)]
pub struct UpdateUserPayload {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
}

/// Body of reject/delete requests.
#[derive(Deserialize, Debug, Default)]
pub struct ReasonPayload {
  #[serde(default)]
  pub reason: Option<String>,
}

impl ReasonPayload {
  fn trimmed(&self) -> String {
    self.reason.as_deref().map(str::trim).unwrap_or_default().to_string()
  }
}

#[instrument(name = "handler::admin_stats", skip_all, fields(admin_id = admin.user_id()))]
pub async fn stats_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let stats = admin_service::dashboard_stats(app_state.store.as_ref()).await?;
  Ok(responses::ok("Dashboard statistics loaded", stats))
}

#[instrument(name = "handler::admin_list_users", skip_all, fields(admin_id = admin.user_id()))]
pub async fn list_users_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let users = app_state.store.list_users().await?;
  Ok(responses::ok(format!("{} users found", users.len()), users))
}

#[instrument(name = "handler::admin_update_user", skip(app_state, req_payload, admin), fields(admin_id = admin.user_id()))]
pub async fn update_user_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
  req_payload: web::Json<UpdateUserPayload>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let username = req_payload.username.trim();
  let email = req_payload.email.trim().to_lowercase();
  let user = admin_service::update_user(app_state.store.as_ref(), user_id, username, &email).await?;
  Ok(responses::ok("User updated successfully", user))
}

#[instrument(name = "handler::admin_delete_user", skip(app_state, req_payload, admin), fields(admin_id = admin.user_id()))]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
  req_payload: Option<web::Json<ReasonPayload>>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let reason = req_payload.map(|p| p.trimmed()).unwrap_or_default();
  admin_service::delete_user(app_state.store.as_ref(), user_id, &reason).await?;
  Ok(responses::ok(
    "User deleted successfully",
    json!({ "userId": user_id, "reason": reason }),
  ))
}

#[instrument(name = "handler::admin_list_orders", skip_all, fields(admin_id = admin.user_id()))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let orders =
    order_service::list_all_orders(app_state.store.as_ref(), app_state.config.legacy_avg_pizza_price_cents).await?;
  Ok(responses::ok(format!("{} orders found", orders.len()), orders))
}

#[instrument(name = "handler::admin_accept_order", skip(app_state, admin), fields(admin_id = admin.user_id()))]
pub async fn accept_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  order_service::accept_order(app_state.store.as_ref(), order_id).await?;
  Ok(responses::ok(
    "Order accepted",
    json!({ "orderId": order_id, "status": "accepted" }),
  ))
}

#[instrument(name = "handler::admin_reject_order", skip(app_state, req_payload, admin), fields(admin_id = admin.user_id()))]
pub async fn reject_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
  req_payload: Option<web::Json<ReasonPayload>>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let reason = req_payload.map(|p| p.trimmed()).unwrap_or_default();
  order_service::reject_order(app_state.store.as_ref(), order_id, &reason).await?;
  Ok(responses::ok(
    "Order rejected",
    json!({ "orderId": order_id, "status": "rejected", "rejection_reason": reason }),
  ))
}

#[instrument(name = "handler::admin_list_reviews", skip_all, fields(admin_id = admin.user_id()))]
pub async fn list_reviews_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let reviews = app_state.store.list_reviews().await?;
  Ok(responses::ok(format!("{} reviews found", reviews.len()), reviews))
}

#[instrument(name = "handler::admin_delete_review", skip(app_state, req_payload, admin), fields(admin_id = admin.user_id()))]
pub async fn delete_review_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
  req_payload: Option<web::Json<ReasonPayload>>,
) -> Result<HttpResponse, AppError> {
  let review_id = path.into_inner();
  let reason = req_payload.map(|p| p.trimmed()).unwrap_or_default();
  admin_service::delete_review(app_state.store.as_ref(), review_id, &reason).await?;
  Ok(responses::ok(
    "Review deleted successfully",
    json!({ "reviewId": review_id, "reason": reason }),
  ))
}
