// server/src/store/mod.rs

//! Persistence port and its adapters.
//!
//! Handlers and pipelines only ever see [`ShopStore`]. `PgStore` is the
//! production adapter; `MemoryStore` backs tests and database-less runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::{
  AdminOrderRow, Ingredient, NewOrder, NewOrderItem, NewReview, NewUser, Order, OrderItemRow, OrderStatus, Pizza,
  Review, ReviewWithAuthor, Role, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("query failed: {0}")]
  Query(String),

  /// A unique constraint rejected the write; `field` names the column.
  #[error("unique constraint violated on '{field}'")]
  UniqueViolation { field: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Aggregates for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
  pub new_users_30_days: i64,
  pub orders_30_days: i64,
  pub pizzas_sold_30_days: i64,
  pub total_active_users: i64,
  pub pending_orders: i64,
  pub total_reviews: i64,
}

#[async_trait]
pub trait ShopStore: Send + Sync {
  // users
  async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
  /// Every user whose email or username matches; the caller tells them apart.
  async fn find_users_by_email_or_username(&self, email: &str, username: &str) -> StoreResult<Vec<User>>;
  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;
  async fn list_users(&self) -> StoreResult<Vec<User>>;
  async fn update_user_identity(&self, user_id: i64, username: &str, email: &str) -> StoreResult<Option<User>>;
  async fn set_user_role(&self, user_id: i64, role: Role) -> StoreResult<bool>;
  /// Removes the user together with their orders, order items and reviews.
  async fn delete_user(&self, user_id: i64) -> StoreResult<bool>;

  // catalog
  async fn list_pizzas(&self) -> StoreResult<Vec<Pizza>>;
  async fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>>;

  // orders
  async fn insert_order(&self, new_order: NewOrder) -> StoreResult<Order>;
  async fn insert_order_items(&self, order_id: i64, items: &[NewOrderItem]) -> StoreResult<()>;
  /// Deletes the order and its items.
  async fn delete_order(&self, order_id: i64) -> StoreResult<bool>;
  async fn find_order_for_owner(&self, order_id: i64, owner_id: i64) -> StoreResult<Option<Order>>;
  /// Newest first.
  async fn list_orders_for_owner(&self, owner_id: i64) -> StoreResult<Vec<Order>>;
  /// Newest first, with the owner's username.
  async fn list_all_orders(&self) -> StoreResult<Vec<AdminOrderRow>>;
  /// Items of the given orders, ordered by order then item id.
  async fn list_order_items(&self, order_ids: &[i64]) -> StoreResult<Vec<OrderItemRow>>;
  /// Sets `cancelled_at` unless it is already set. Returns whether a row changed.
  async fn mark_order_cancelled(&self, order_id: i64, at: DateTime<Utc>) -> StoreResult<bool>;
  /// Moves a pending, uncancelled order to `to`. Returns the number of rows changed.
  async fn transition_pending_order(
    &self,
    order_id: i64,
    to: OrderStatus,
    rejection_reason: Option<&str>,
    at: DateTime<Utc>,
  ) -> StoreResult<u64>;

  // reviews
  async fn insert_review(&self, new_review: NewReview) -> StoreResult<Review>;
  /// Newest first, with the author's username.
  async fn list_reviews(&self) -> StoreResult<Vec<ReviewWithAuthor>>;
  async fn delete_review(&self, review_id: i64) -> StoreResult<bool>;

  async fn dashboard_stats(&self, since: DateTime<Utc>) -> StoreResult<DashboardStats>;
}
