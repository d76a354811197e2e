// server/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use super::{DashboardStats, ShopStore, StoreError, StoreResult};
use crate::models::{
  AdminOrderRow, Ingredient, NewOrder, NewOrderItem, NewReview, NewUser, Order, OrderItemRow, OrderStatus, Pizza,
  Review, ReviewWithAuthor, Role, User,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";
const ORDER_COLUMNS: &str =
  "id, user_id, total_price_cents, status, delivery_address, rejection_reason, cancelled_at, status_updated_at, order_date";

impl From<sqlx::Error> for StoreError {
  fn from(err: sqlx::Error) -> Self {
    if let sqlx::Error::Database(db_err) = &err {
      if db_err.is_unique_violation() {
        let field = match db_err.constraint() {
          Some("users_email_key") => "email",
          Some("users_username_key") => "username",
          Some(other) => other,
          None => "unknown",
        };
        return StoreError::UniqueViolation {
          field: field.to_string(),
        };
      }
    }
    StoreError::Query(err.to_string())
  }
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  #[instrument(name = "PgStore::connect", skip(database_url), err(Display))]
  pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    Ok(Self::new(pool))
  }

  /// Applies `server/migrations` (schema and catalog seed).
  #[instrument(name = "PgStore::migrate", skip(self), err(Display))]
  pub async fn migrate(&self) -> StoreResult<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(|e| StoreError::Query(format!("migration failed: {}", e)))
  }
}

#[async_trait]
impl ShopStore for PgStore {
  #[instrument(name = "PgStore::find_user_by_id", skip(self), err(Display))]
  async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).bind(user_id).fetch_optional(&self.pool).await?)
  }

  #[instrument(name = "PgStore::find_user_by_email", skip(self), err(Display))]
  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
  }

  #[instrument(name = "PgStore::find_users_by_email_or_username", skip(self), err(Display))]
  async fn find_users_by_email_or_username(&self, email: &str, username: &str) -> StoreResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = $1 OR username = $2", USER_COLUMNS);
    Ok(
      sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .bind(username)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::insert_user", skip(self, new_user), fields(username = %new_user.username), err(Display))]
  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
    let sql = format!(
      "INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
      USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
      .bind(&new_user.username)
      .bind(&new_user.email)
      .bind(&new_user.password_hash)
      .bind(new_user.role)
      .fetch_one(&self.pool)
      .await?;
    debug!(user_id = user.id, "User row inserted.");
    Ok(user)
  }

  #[instrument(name = "PgStore::list_users", skip(self), err(Display))]
  async fn list_users(&self) -> StoreResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
  }

  #[instrument(name = "PgStore::update_user_identity", skip(self), err(Display))]
  async fn update_user_identity(&self, user_id: i64, username: &str, email: &str) -> StoreResult<Option<User>> {
    let sql = format!(
      "UPDATE users SET username = $2, email = $3 WHERE id = $1 RETURNING {}",
      USER_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::set_user_role", skip(self), err(Display))]
  async fn set_user_role(&self, user_id: i64, role: Role) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
      .bind(user_id)
      .bind(role)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::delete_user", skip(self), err(Display))]
  async fn delete_user(&self, user_id: i64) -> StoreResult<bool> {
    // orders, order_items and reviews follow through ON DELETE CASCADE
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::list_pizzas", skip(self), err(Display))]
  async fn list_pizzas(&self) -> StoreResult<Vec<Pizza>> {
    Ok(
      sqlx::query_as::<_, Pizza>("SELECT id, name, description, base_price_cents FROM pizzas ORDER BY id")
        .fetch_all(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::list_ingredients", skip(self), err(Display))]
  async fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>> {
    Ok(
      sqlx::query_as::<_, Ingredient>("SELECT id, name, price_cents, category FROM ingredients ORDER BY id")
        .fetch_all(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::insert_order", skip(self, new_order), fields(user_id = new_order.user_id), err(Display))]
  async fn insert_order(&self, new_order: NewOrder) -> StoreResult<Order> {
    let sql = format!(
      "INSERT INTO orders (user_id, total_price_cents, status, delivery_address) VALUES ($1, $2, $3, $4) RETURNING {}",
      ORDER_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(new_order.user_id)
        .bind(new_order.total_price_cents)
        .bind(OrderStatus::Pending)
        .bind(&new_order.delivery_address)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::insert_order_items", skip(self, items), fields(item_count = items.len()), err(Display))]
  async fn insert_order_items(&self, order_id: i64, items: &[NewOrderItem]) -> StoreResult<()> {
    if items.is_empty() {
      return Ok(());
    }
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
      let label = serde_json::to_value(&item.label)
        .map_err(|e| StoreError::Query(format!("could not encode item label: {}", e)))?;
      rows.push((item.pizza_id, label, item.quantity, item.item_price_cents));
    }

    let mut builder: QueryBuilder<Postgres> =
      QueryBuilder::new("INSERT INTO order_items (order_id, pizza_id, custom_ingredients, quantity, item_price_cents) ");
    builder.push_values(rows, |mut row, (pizza_id, label, quantity, price)| {
      row
        .push_bind(order_id)
        .push_bind(pizza_id)
        .push_bind(label)
        .push_bind(quantity)
        .push_bind(price);
    });
    builder.build().execute(&self.pool).await?;
    Ok(())
  }

  #[instrument(name = "PgStore::delete_order", skip(self), err(Display))]
  async fn delete_order(&self, order_id: i64) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::find_order_for_owner", skip(self), err(Display))]
  async fn find_order_for_owner(&self, order_id: i64, owner_id: i64) -> StoreResult<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1 AND user_id = $2", ORDER_COLUMNS);
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::list_orders_for_owner", skip(self), err(Display))]
  async fn list_orders_for_owner(&self, owner_id: i64) -> StoreResult<Vec<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE user_id = $1 ORDER BY id DESC", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql).bind(owner_id).fetch_all(&self.pool).await?)
  }

  #[instrument(name = "PgStore::list_all_orders", skip(self), err(Display))]
  async fn list_all_orders(&self) -> StoreResult<Vec<AdminOrderRow>> {
    Ok(
      sqlx::query_as::<_, AdminOrderRow>(
        "SELECT o.id, o.user_id, o.total_price_cents, o.status, o.delivery_address, o.rejection_reason, \
         o.cancelled_at, o.status_updated_at, o.order_date, u.username AS customer_username \
         FROM orders o JOIN users u ON u.id = o.user_id ORDER BY o.id DESC",
      )
      .fetch_all(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "PgStore::list_order_items", skip(self, order_ids), fields(order_count = order_ids.len()), err(Display))]
  async fn list_order_items(&self, order_ids: &[i64]) -> StoreResult<Vec<OrderItemRow>> {
    if order_ids.is_empty() {
      return Ok(Vec::new());
    }
    Ok(
      sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.id, oi.order_id, oi.pizza_id, oi.custom_ingredients, oi.quantity, oi.item_price_cents, \
         p.name AS catalog_pizza_name \
         FROM order_items oi LEFT JOIN pizzas p ON p.id = oi.pizza_id \
         WHERE oi.order_id = ANY($1) ORDER BY oi.order_id, oi.id",
      )
      .bind(order_ids)
      .fetch_all(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "PgStore::mark_order_cancelled", skip(self), err(Display))]
  async fn mark_order_cancelled(&self, order_id: i64, at: DateTime<Utc>) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE orders SET cancelled_at = $2 WHERE id = $1 AND cancelled_at IS NULL")
      .bind(order_id)
      .bind(at)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::transition_pending_order", skip(self, rejection_reason), err(Display))]
  async fn transition_pending_order(
    &self,
    order_id: i64,
    to: OrderStatus,
    rejection_reason: Option<&str>,
    at: DateTime<Utc>,
  ) -> StoreResult<u64> {
    let result = sqlx::query(
      "UPDATE orders SET status = $2, rejection_reason = COALESCE($3, rejection_reason), status_updated_at = $4 \
       WHERE id = $1 AND status = 'pending' AND cancelled_at IS NULL",
    )
    .bind(order_id)
    .bind(to)
    .bind(rejection_reason)
    .bind(at)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "PgStore::insert_review", skip(self, new_review), fields(user_id = new_review.user_id), err(Display))]
  async fn insert_review(&self, new_review: NewReview) -> StoreResult<Review> {
    Ok(
      sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (user_id, rating, comment) VALUES ($1, $2, $3) \
         RETURNING id, user_id, rating, comment, created_at",
      )
      .bind(new_review.user_id)
      .bind(new_review.rating)
      .bind(&new_review.comment)
      .fetch_one(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "PgStore::list_reviews", skip(self), err(Display))]
  async fn list_reviews(&self) -> StoreResult<Vec<ReviewWithAuthor>> {
    Ok(
      sqlx::query_as::<_, ReviewWithAuthor>(
        "SELECT r.id, r.user_id, u.username, r.rating, r.comment, r.created_at \
         FROM reviews r JOIN users u ON u.id = r.user_id ORDER BY r.created_at DESC, r.id DESC",
      )
      .fetch_all(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "PgStore::delete_review", skip(self), err(Display))]
  async fn delete_review(&self, review_id: i64) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
      .bind(review_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::dashboard_stats", skip(self), err(Display))]
  async fn dashboard_stats(&self, since: DateTime<Utc>) -> StoreResult<DashboardStats> {
    Ok(
      sqlx::query_as::<_, DashboardStats>(
        "SELECT \
           (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS new_users_30_days, \
           (SELECT COUNT(*) FROM orders WHERE order_date >= $1) AS orders_30_days, \
           (SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT FROM order_items oi JOIN orders o ON o.id = oi.order_id \
              WHERE o.order_date >= $1 AND o.cancelled_at IS NULL AND o.status <> 'rejected') AS pizzas_sold_30_days, \
           (SELECT COUNT(*) FROM users WHERE role = 'customer') AS total_active_users, \
           (SELECT COUNT(*) FROM orders WHERE status = 'pending' AND cancelled_at IS NULL) AS pending_orders, \
           (SELECT COUNT(*) FROM reviews) AS total_reviews",
      )
      .bind(since)
      .fetch_one(&self.pool)
      .await?,
    )
  }
}
