// server/src/services/order_service.rs

//! Order reads and state changes after placement.
//!
//! Placement itself runs as a pipeline (see `pipelines::place_order_pipeline`)
//! because it needs a compensating delete. Everything here is a single
//! store call guarded by the lifecycle rules on [`Order`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::{money, AdminOrderRow, Order, OrderItemRow, OrderStatus};
use crate::store::ShopStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemView {
  pub pizza_name: String,
  pub quantity: i32,
  pub item_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
  pub id: i64,
  pub items: Vec<OrderItemView>,
  pub total_price: f64,
  pub status: OrderStatus,
  pub cancelled: bool,
  pub order_date: DateTime<Utc>,
  pub delivery_address: String,
  pub rejection_reason: Option<String>,
  pub status_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderView {
  #[serde(flatten)]
  pub order: OrderView,
  pub user_id: i64,
  pub customer_username: String,
}

/// Item list for orders stored before line items were tracked.
///
/// Splits the total into `round(total / avg)` pizzas (at least one). A zero
/// total yields a single placeholder line.
pub fn legacy_items(total_cents: i64, avg_pizza_cents: i64) -> Vec<OrderItemView> {
  if total_cents <= 0 || avg_pizza_cents <= 0 {
    return vec![OrderItemView {
      pizza_name: "Legacy order (details unavailable)".to_string(),
      quantity: 1,
      item_price: money::to_decimal(total_cents.max(0)),
    }];
  }
  let count = ((total_cents as f64 / avg_pizza_cents as f64).round() as i64).max(1);
  let per_pizza = (total_cents as f64 / count as f64).round() as i64;
  (1..=count)
    .map(|i| OrderItemView {
      pizza_name: format!("Pizza {} (legacy order)", i),
      quantity: 1,
      item_price: money::to_decimal(per_pizza),
    })
    .collect()
}

fn view_of(order: &Order, items: Option<&Vec<OrderItemRow>>, legacy_avg_cents: i64) -> OrderView {
  let items = match items {
    Some(rows) if !rows.is_empty() => rows
      .iter()
      .map(|row| OrderItemView {
        pizza_name: row.display_name(),
        quantity: row.quantity,
        item_price: money::to_decimal(row.item_price_cents),
      })
      .collect(),
    _ => legacy_items(order.total_price_cents, legacy_avg_cents),
  };
  OrderView {
    id: order.id,
    items,
    total_price: money::to_decimal(order.total_price_cents),
    status: order.status,
    cancelled: order.is_cancelled(),
    order_date: order.order_date,
    delivery_address: order.displayed_address(),
    rejection_reason: order.rejection_reason.clone(),
    status_updated_at: order.status_updated_at,
  }
}

fn group_items(rows: Vec<OrderItemRow>) -> HashMap<i64, Vec<OrderItemRow>> {
  let mut by_order: HashMap<i64, Vec<OrderItemRow>> = HashMap::new();
  for row in rows {
    by_order.entry(row.order_id).or_default().push(row);
  }
  by_order
}

/// Attaches item views to each order, keeping the order of `orders`.
pub fn materialize(orders: &[Order], item_rows: Vec<OrderItemRow>, legacy_avg_cents: i64) -> Vec<OrderView> {
  let by_order = group_items(item_rows);
  orders
    .iter()
    .map(|order| view_of(order, by_order.get(&order.id), legacy_avg_cents))
    .collect()
}

#[instrument(name = "order_service::list_for_owner", skip(store), err(Display))]
pub async fn list_orders_for_owner(store: &dyn ShopStore, owner_id: i64, legacy_avg_cents: i64) -> Result<Vec<OrderView>> {
  let orders = store.list_orders_for_owner(owner_id).await?;
  let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
  let rows = store.list_order_items(&ids).await?;
  Ok(materialize(&orders, rows, legacy_avg_cents))
}

#[instrument(name = "order_service::list_all", skip(store), err(Display))]
pub async fn list_all_orders(store: &dyn ShopStore, legacy_avg_cents: i64) -> Result<Vec<AdminOrderView>> {
  let rows: Vec<AdminOrderRow> = store.list_all_orders().await?;
  let ids: Vec<i64> = rows.iter().map(|r| r.order.id).collect();
  let by_order = group_items(store.list_order_items(&ids).await?);
  Ok(
    rows
      .into_iter()
      .map(|row| AdminOrderView {
        order: view_of(&row.order, by_order.get(&row.order.id), legacy_avg_cents),
        user_id: row.order.user_id,
        customer_username: row.customer_username,
      })
      .collect(),
  )
}

async fn owned_order(store: &dyn ShopStore, owner_id: i64, order_id: i64) -> Result<Order> {
  store
    .find_order_for_owner(order_id, owner_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found or access denied", order_id)))
}

/// Marks the caller's order as cancelled. Status is left as it was.
#[instrument(name = "order_service::cancel", skip(store), err(Display))]
pub async fn cancel_order(store: &dyn ShopStore, owner_id: i64, order_id: i64) -> Result<Order> {
  let mut order = owned_order(store, owner_id, order_id).await?;
  if order.is_cancelled() {
    return Err(AppError::AlreadyCancelled(order_id));
  }
  if !order.can_cancel() {
    return Err(AppError::OrderNotCancellable {
      order_id,
      status: order.status.to_string(),
    });
  }

  let now = Utc::now();
  if !store.mark_order_cancelled(order_id, now).await? {
    // lost a race with a concurrent cancel
    warn!(order_id, "Order was cancelled concurrently.");
    return Err(AppError::AlreadyCancelled(order_id));
  }
  order.cancelled_at = Some(now);
  info!(order_id, owner_id, "Order cancelled by owner.");
  Ok(order)
}

/// Removes a cancelled order of the caller together with its items.
#[instrument(name = "order_service::delete", skip(store), err(Display))]
pub async fn delete_order(store: &dyn ShopStore, owner_id: i64, order_id: i64) -> Result<()> {
  let order = owned_order(store, owner_id, order_id).await?;
  if !order.is_cancelled() {
    return Err(AppError::OrderNotCancelled(order_id));
  }
  if !store.delete_order(order_id).await? {
    return Err(AppError::NotFound(format!("Order {} not found or access denied", order_id)));
  }
  info!(order_id, owner_id, "Cancelled order deleted by owner.");
  Ok(())
}

#[instrument(name = "order_service::accept", skip(store), err(Display))]
pub async fn accept_order(store: &dyn ShopStore, order_id: i64) -> Result<()> {
  let changed = store
    .transition_pending_order(order_id, OrderStatus::Accepted, None, Utc::now())
    .await?;
  if changed == 0 {
    return Err(AppError::NotFoundOrAlreadyHandled(order_id));
  }
  info!(target: "admin_audit", order_id, "Order accepted.");
  Ok(())
}

/// `reason` must already be trimmed and non-empty.
#[instrument(name = "order_service::reject", skip(store, reason), err(Display))]
pub async fn reject_order(store: &dyn ShopStore, order_id: i64, reason: &str) -> Result<()> {
  if reason.is_empty() {
    return Err(AppError::missing_fields("A rejection reason is required"));
  }
  let changed = store
    .transition_pending_order(order_id, OrderStatus::Rejected, Some(reason), Utc::now())
    .await?;
  if changed == 0 {
    return Err(AppError::NotFoundOrAlreadyHandled(order_id));
  }
  info!(target: "admin_audit", order_id, reason, "Order rejected.");
  Ok(())
}
