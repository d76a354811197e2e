// server/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};

/// Appended to the presented delivery address of a cancelled order.
pub const CANCELLATION_MARKER: &str = "[STORNIERT]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Accepted,
  Preparing,
  Ready,
  Delivered,
  Rejected,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Accepted => "accepted",
      OrderStatus::Preparing => "preparing",
      OrderStatus::Ready => "ready",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Rejected => "rejected",
    }
  }
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  pub total_price_cents: i64,
  pub status: OrderStatus,
  /// Always the address as entered; cancellation lives in `cancelled_at`.
  pub delivery_address: String,
  pub rejection_reason: Option<String>,
  pub cancelled_at: Option<DateTime<Utc>>,
  pub status_updated_at: Option<DateTime<Utc>>,
  pub order_date: DateTime<Utc>,
}

impl Order {
  pub fn is_cancelled(&self) -> bool {
    self.cancelled_at.is_some()
  }

  /// Owners may cancel while the kitchen has not finished the order.
  pub fn can_cancel(&self) -> bool {
    !self.is_cancelled() && matches!(self.status, OrderStatus::Pending | OrderStatus::Preparing)
  }

  pub fn displayed_address(&self) -> String {
    if !self.is_cancelled() {
      return self.delivery_address.clone();
    }
    if self.delivery_address.is_empty() {
      CANCELLATION_MARKER.to_string()
    } else {
      format!("{} {}", self.delivery_address, CANCELLATION_MARKER)
    }
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminOrderRow {
  #[sqlx(flatten)]
  pub order: Order,
  pub customer_username: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_id: i64,
  pub total_price_cents: i64,
  pub delivery_address: String,
}
