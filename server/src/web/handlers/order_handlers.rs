// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::errors::AppError;
use crate::models::money;
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::order_service;
use crate::services::pricing::CartItem;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::responses;
use pizzeria_flow::{ContextData, PipelineResult};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  #[serde(default)]
  pub items: Vec<CartItem>,
  #[serde(default)]
  pub delivery_address: Option<String>,
  #[serde(default)]
  pub total_price: Option<f64>,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload, auth_user),
    fields(user_id = auth_user.user_id(), item_count = req_payload.items.len())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let delivery_address = payload.delivery_address.unwrap_or_default().trim().to_string();

  let order_ctx = PlaceOrderCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id(),
    payload.items,
    delivery_address,
    payload.total_price,
  );
  let ctx_data = ContextData::new(order_ctx);

  match app_state.pipelines.place_order.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let order = ctx_data.read().created_order.clone().ok_or_else(|| {
        warn!("Place order pipeline completed without an order in context.");
        AppError::Internal("Order placement completed without creating an order.".to_string())
      })?;
      info!(order_id = order.id, total_cents = order.total_price_cents, "Order placed.");

      Ok(responses::created(
        "Order created successfully",
        json!({
            "orderId": order.id,
            "status": order.status,
            "total_price": money::to_decimal(order.total_price_cents),
        }),
      ))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Place order pipeline was stopped by a step.");
      Err(AppError::Internal("Order placement was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      if ctx_data.read().rolled_back {
        error!(error = %app_err, "Order placement failed after the order row was written; row removed.");
      } else {
        warn!(error = %app_err, "Order placement rejected.");
      }
      Err(app_err)
    }
  }
}

/// Lists the caller's own orders. `user_id` in the path must be the caller.
#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(caller_id = auth_user.user_id()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  if user_id != auth_user.user_id() {
    warn!(requested_user_id = user_id, "Attempt to list another user's orders.");
    return Err(AppError::Forbidden("You can only view your own orders".to_string()));
  }

  let orders = order_service::list_orders_for_owner(
    app_state.store.as_ref(),
    user_id,
    app_state.config.legacy_avg_pizza_price_cents,
  )
  .await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::cancel_order", skip(app_state, auth_user), fields(caller_id = auth_user.user_id()))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = order_service::cancel_order(app_state.store.as_ref(), auth_user.user_id(), order_id).await?;

  Ok(responses::ok(
    "Order cancelled successfully",
    json!({
        "orderId": order.id,
        "status": order.status,
        "cancelled": true,
        "delivery_address": order.displayed_address(),
    }),
  ))
}

#[instrument(name = "handler::delete_order", skip(app_state, auth_user), fields(caller_id = auth_user.user_id()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  order_service::delete_order(app_state.store.as_ref(), auth_user.user_id(), order_id).await?;
  Ok(responses::ok("Order deleted successfully", json!({ "orderId": order_id })))
}
