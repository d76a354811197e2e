// server/src/pipelines/place_order_pipeline.rs

//! Order placement: price the cart, write the order row, then its items.
//!
//! The two writes are separate statements. If the items cannot be stored the
//! compensation on `insert_order` deletes the order row again, so no empty
//! order is left behind.

use crate::errors::AppError;
use crate::models::NewOrder;
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::pricing::Catalog;
use pizzeria_flow::{ContextData, Pipeline, PipelineControl};
use tracing::{error, event, info, instrument, warn, Level};

pub fn build_place_order_pipeline() -> Pipeline<PlaceOrderCtxData, AppError> {
  let mut order_p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("price_cart", false),
    ("insert_order", false),
    ("insert_order_items", false),
  ]);

  order_p.on_step("price_cart", price_cart_step);
  order_p.on_step("insert_order", insert_order_step);
  order_p.compensate_step("insert_order", delete_order_compensation);
  order_p.on_step("insert_order_items", insert_order_items_step);
  order_p
}

#[instrument(name = "place_order::price_cart", skip_all, err(Display))]
async fn price_cart_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, custom_base_cents) = {
    let guard = ctx_data.read();
    (
      guard.app_state.store.clone(),
      guard.app_state.config.custom_pizza_base_price_cents,
    )
  };
  let pizzas = store.list_pizzas().await?;
  let ingredients = store.list_ingredients().await?;

  let priced = {
    let guard = ctx_data.read();
    Catalog::new(&pizzas, &ingredients, custom_base_cents).price_cart(&guard.items, guard.claimed_total)?
  };
  event!(
    Level::DEBUG,
    item_count = priced.items.len(),
    total_cents = priced.total_cents,
    "Cart priced from the catalog."
  );
  ctx_data.write().priced = Some(priced);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "place_order::insert_order", skip_all, err(Display))]
async fn insert_order_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_order) = {
    let guard = ctx_data.read();
    let total_price_cents = guard
      .priced
      .as_ref()
      .map(|p| p.total_cents)
      .ok_or_else(|| AppError::Internal("insert_order ran before price_cart".to_string()))?;
    (
      guard.app_state.store.clone(),
      NewOrder {
        user_id: guard.user_id,
        total_price_cents,
        delivery_address: guard.delivery_address.clone(),
      },
    )
  };

  let order = store.insert_order(new_order).await?;
  info!(order_id = order.id, user_id = order.user_id, "Order row created.");
  ctx_data.write().created_order = Some(order);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "place_order::insert_order_items", skip_all, err(Display))]
async fn insert_order_items_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id, items) = {
    let guard = ctx_data.read();
    let order_id = guard
      .created_order
      .as_ref()
      .map(|o| o.id)
      .ok_or_else(|| AppError::Internal("insert_order_items ran before insert_order".to_string()))?;
    let items = guard
      .priced
      .as_ref()
      .map(|p| p.items.clone())
      .ok_or_else(|| AppError::Internal("insert_order_items ran before price_cart".to_string()))?;
    (guard.app_state.store.clone(), order_id, items)
  };

  if let Err(store_err) = store.insert_order_items(order_id, &items).await {
    error!(order_id, error = %store_err, "Storing order items failed.");
    return Err(store_err.into());
  }
  info!(order_id, item_count = items.len(), "Order items stored.");
  Ok(PipelineControl::Continue)
}

async fn delete_order_compensation(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<(), AppError> {
  let (store, order_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.created_order.as_ref().map(|o| o.id))
  };
  let Some(order_id) = order_id else {
    return Ok(());
  };

  let removed = store.delete_order(order_id).await?;
  if !removed {
    warn!(order_id, "Compensation found no order row to delete.");
  }
  {
    let mut guard = ctx_data.write();
    guard.created_order = None;
    guard.rolled_back = true;
  }
  info!(order_id, "Order row removed after failed item insert.");
  Ok(())
}
