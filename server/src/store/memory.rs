// server/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{DashboardStats, ShopStore, StoreError, StoreResult};
use crate::models::{
  AdminOrderRow, Ingredient, IngredientCategory, NewOrder, NewOrderItem, NewReview, NewUser, Order, OrderItemRow,
  OrderStatus, Pizza, Review, ReviewWithAuthor, Role, User,
};

#[derive(Debug, Clone)]
struct StoredItem {
  id: i64,
  order_id: i64,
  pizza_id: Option<i64>,
  label: Option<serde_json::Value>,
  quantity: i32,
  item_price_cents: i64,
}

#[derive(Default)]
struct Tables {
  users: BTreeMap<i64, User>,
  pizzas: BTreeMap<i64, Pizza>,
  ingredients: BTreeMap<i64, Ingredient>,
  orders: BTreeMap<i64, Order>,
  order_items: BTreeMap<i64, StoredItem>,
  reviews: BTreeMap<i64, Review>,
  next_id: i64,
}

impl Tables {
  fn next_id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id
  }

  fn ensure_unique(&self, email: &str, username: &str, except: Option<i64>) -> StoreResult<()> {
    for user in self.users.values().filter(|u| Some(u.id) != except) {
      if user.email == email {
        return Err(StoreError::UniqueViolation {
          field: "email".to_string(),
        });
      }
      if user.username == username {
        return Err(StoreError::UniqueViolation {
          field: "username".to_string(),
        });
      }
    }
    Ok(())
  }

  fn remove_order(&mut self, order_id: i64) -> bool {
    self.order_items.retain(|_, item| item.order_id != order_id);
    self.orders.remove(&order_id).is_some()
  }
}

/// In-process store. Catalog ids match the rows seeded by the migrations.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
  fail_item_inserts: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_default_catalog() -> Self {
    let store = Self::new();
    {
      let mut tables = store.tables.lock();
      let pizzas = [
        ("Margherita", "Tomato sauce, mozzarella, basil", 950),
        ("Funghi", "Tomato sauce, mozzarella, mushrooms", 1050),
        ("Salami", "Tomato sauce, mozzarella, salami", 1100),
        ("Hawaii", "Tomato sauce, mozzarella, ham, pineapple", 1150),
        ("Döner", "Tomato sauce, mozzarella, döner meat, onions, garlic sauce", 1250),
      ];
      for (idx, (name, description, cents)) in pizzas.into_iter().enumerate() {
        let id = idx as i64 + 1;
        tables.pizzas.insert(
          id,
          Pizza {
            id,
            name: name.to_string(),
            description: Some(description.to_string()),
            base_price_cents: cents,
          },
        );
      }

      use IngredientCategory::*;
      let ingredients = [
        ("Tomato Sauce", 0, Sauce),
        ("Mozzarella", 0, Cheese),
        ("Garlic Sauce", 50, Sauce),
        ("Gorgonzola", 150, Cheese),
        ("Salami", 150, Meat),
        ("Ham", 150, Meat),
        ("Mushrooms", 100, Vegetable),
        ("Bell Peppers", 80, Vegetable),
        ("Onions", 50, Vegetable),
        ("Pineapple", 100, Other),
      ];
      for (idx, (name, cents, category)) in ingredients.into_iter().enumerate() {
        let id = idx as i64 + 1;
        tables.ingredients.insert(
          id,
          Ingredient {
            id,
            name: name.to_string(),
            price_cents: cents,
            category,
          },
        );
      }
    }
    store
  }

  /// Makes every following `insert_order_items` call fail.
  pub fn fail_order_item_inserts(&self, fail: bool) {
    self.fail_item_inserts.store(fail, Ordering::SeqCst);
  }

  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }

  /// Inserts an order row with no items, as orders placed before item tracking look.
  pub fn insert_legacy_order(&self, user_id: i64, total_price_cents: i64) -> Order {
    let mut tables = self.tables.lock();
    let id = tables.next_id();
    let order = Order {
      id,
      user_id,
      total_price_cents,
      status: OrderStatus::Delivered,
      delivery_address: String::new(),
      rejection_reason: None,
      cancelled_at: None,
      status_updated_at: None,
      order_date: Utc::now(),
    };
    tables.orders.insert(id, order.clone());
    order
  }

  /// Forces an order into `status`, bypassing the pending-only rule.
  pub fn set_order_status(&self, order_id: i64, status: OrderStatus) -> bool {
    match self.tables.lock().orders.get_mut(&order_id) {
      Some(order) => {
        order.status = status;
        true
      }
      None => false,
    }
  }

  pub fn password_hash_of(&self, email: &str) -> Option<String> {
    self
      .tables
      .lock()
      .users
      .values()
      .find(|u| u.email == email)
      .map(|u| u.password_hash.clone())
  }

  /// Overwrites a stored hash, as rows imported from another system would carry.
  pub fn set_password_hash(&self, email: &str, password_hash: &str) {
    let mut tables = self.tables.lock();
    if let Some(user) = tables.users.values_mut().find(|u| u.email == email) {
      user.password_hash = password_hash.to_string();
    }
  }
}

#[async_trait]
impl ShopStore for MemoryStore {
  async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
    Ok(self.tables.lock().users.get(&user_id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    Ok(self.tables.lock().users.values().find(|u| u.email == email).cloned())
  }

  async fn find_users_by_email_or_username(&self, email: &str, username: &str) -> StoreResult<Vec<User>> {
    Ok(
      self
        .tables
        .lock()
        .users
        .values()
        .filter(|u| u.email == email || u.username == username)
        .cloned()
        .collect(),
    )
  }

  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
    let mut tables = self.tables.lock();
    tables.ensure_unique(&new_user.email, &new_user.username, None)?;
    let id = tables.next_id();
    let user = User {
      id,
      username: new_user.username,
      email: new_user.email,
      password_hash: new_user.password_hash,
      role: new_user.role,
      created_at: Utc::now(),
    };
    tables.users.insert(id, user.clone());
    Ok(user)
  }

  async fn list_users(&self) -> StoreResult<Vec<User>> {
    Ok(self.tables.lock().users.values().cloned().collect())
  }

  async fn update_user_identity(&self, user_id: i64, username: &str, email: &str) -> StoreResult<Option<User>> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&user_id) {
      return Ok(None);
    }
    tables.ensure_unique(email, username, Some(user_id))?;
    Ok(tables.users.get_mut(&user_id).map(|user| {
      user.username = username.to_string();
      user.email = email.to_string();
      user.clone()
    }))
  }

  async fn set_user_role(&self, user_id: i64, role: Role) -> StoreResult<bool> {
    Ok(match self.tables.lock().users.get_mut(&user_id) {
      Some(user) => {
        user.role = role;
        true
      }
      None => false,
    })
  }

  async fn delete_user(&self, user_id: i64) -> StoreResult<bool> {
    let mut tables = self.tables.lock();
    if tables.users.remove(&user_id).is_none() {
      return Ok(false);
    }
    let owned: Vec<i64> = tables
      .orders
      .values()
      .filter(|o| o.user_id == user_id)
      .map(|o| o.id)
      .collect();
    for order_id in owned {
      tables.remove_order(order_id);
    }
    tables.reviews.retain(|_, r| r.user_id != user_id);
    Ok(true)
  }

  async fn list_pizzas(&self) -> StoreResult<Vec<Pizza>> {
    Ok(self.tables.lock().pizzas.values().cloned().collect())
  }

  async fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>> {
    Ok(self.tables.lock().ingredients.values().cloned().collect())
  }

  async fn insert_order(&self, new_order: NewOrder) -> StoreResult<Order> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&new_order.user_id) {
      return Err(StoreError::Query("orders.user_id references a missing user".to_string()));
    }
    let id = tables.next_id();
    let order = Order {
      id,
      user_id: new_order.user_id,
      total_price_cents: new_order.total_price_cents,
      status: OrderStatus::Pending,
      delivery_address: new_order.delivery_address,
      rejection_reason: None,
      cancelled_at: None,
      status_updated_at: None,
      order_date: Utc::now(),
    };
    tables.orders.insert(id, order.clone());
    Ok(order)
  }

  async fn insert_order_items(&self, order_id: i64, items: &[NewOrderItem]) -> StoreResult<()> {
    if self.fail_item_inserts.load(Ordering::SeqCst) {
      return Err(StoreError::Query("order_items insert rejected (injected failure)".to_string()));
    }
    let mut tables = self.tables.lock();
    if !tables.orders.contains_key(&order_id) {
      return Err(StoreError::Query("order_items.order_id references a missing order".to_string()));
    }
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
      let label = serde_json::to_value(&item.label)
        .map_err(|e| StoreError::Query(format!("could not encode item label: {}", e)))?;
      rows.push((item, label));
    }
    for (item, label) in rows {
      let id = tables.next_id();
      tables.order_items.insert(
        id,
        StoredItem {
          id,
          order_id,
          pizza_id: item.pizza_id,
          label: Some(label),
          quantity: item.quantity,
          item_price_cents: item.item_price_cents,
        },
      );
    }
    Ok(())
  }

  async fn delete_order(&self, order_id: i64) -> StoreResult<bool> {
    Ok(self.tables.lock().remove_order(order_id))
  }

  async fn find_order_for_owner(&self, order_id: i64, owner_id: i64) -> StoreResult<Option<Order>> {
    Ok(
      self
        .tables
        .lock()
        .orders
        .get(&order_id)
        .filter(|o| o.user_id == owner_id)
        .cloned(),
    )
  }

  async fn list_orders_for_owner(&self, owner_id: i64) -> StoreResult<Vec<Order>> {
    Ok(
      self
        .tables
        .lock()
        .orders
        .values()
        .rev()
        .filter(|o| o.user_id == owner_id)
        .cloned()
        .collect(),
    )
  }

  async fn list_all_orders(&self) -> StoreResult<Vec<AdminOrderRow>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .orders
        .values()
        .rev()
        .filter_map(|order| {
          tables.users.get(&order.user_id).map(|user| AdminOrderRow {
            order: order.clone(),
            customer_username: user.username.clone(),
          })
        })
        .collect(),
    )
  }

  async fn list_order_items(&self, order_ids: &[i64]) -> StoreResult<Vec<OrderItemRow>> {
    let tables = self.tables.lock();
    let mut rows: Vec<OrderItemRow> = tables
      .order_items
      .values()
      .filter(|item| order_ids.contains(&item.order_id))
      .map(|item| OrderItemRow {
        id: item.id,
        order_id: item.order_id,
        pizza_id: item.pizza_id,
        custom_ingredients: item.label.clone(),
        quantity: item.quantity,
        item_price_cents: item.item_price_cents,
        catalog_pizza_name: item
          .pizza_id
          .and_then(|pizza_id| tables.pizzas.get(&pizza_id))
          .map(|p| p.name.clone()),
      })
      .collect();
    rows.sort_by_key(|row| (row.order_id, row.id));
    Ok(rows)
  }

  async fn mark_order_cancelled(&self, order_id: i64, at: DateTime<Utc>) -> StoreResult<bool> {
    Ok(match self.tables.lock().orders.get_mut(&order_id) {
      Some(order) if order.cancelled_at.is_none() => {
        order.cancelled_at = Some(at);
        true
      }
      _ => false,
    })
  }

  async fn transition_pending_order(
    &self,
    order_id: i64,
    to: OrderStatus,
    rejection_reason: Option<&str>,
    at: DateTime<Utc>,
  ) -> StoreResult<u64> {
    Ok(match self.tables.lock().orders.get_mut(&order_id) {
      Some(order) if order.status == OrderStatus::Pending && order.cancelled_at.is_none() => {
        order.status = to;
        if let Some(reason) = rejection_reason {
          order.rejection_reason = Some(reason.to_string());
        }
        order.status_updated_at = Some(at);
        1
      }
      _ => 0,
    })
  }

  async fn insert_review(&self, new_review: NewReview) -> StoreResult<Review> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&new_review.user_id) {
      return Err(StoreError::Query("reviews.user_id references a missing user".to_string()));
    }
    let id = tables.next_id();
    let review = Review {
      id,
      user_id: new_review.user_id,
      rating: new_review.rating,
      comment: new_review.comment,
      created_at: Utc::now(),
    };
    tables.reviews.insert(id, review.clone());
    Ok(review)
  }

  async fn list_reviews(&self) -> StoreResult<Vec<ReviewWithAuthor>> {
    let tables = self.tables.lock();
    let mut reviews: Vec<ReviewWithAuthor> = tables
      .reviews
      .values()
      .filter_map(|review| {
        tables.users.get(&review.user_id).map(|user| ReviewWithAuthor {
          id: review.id,
          user_id: review.user_id,
          username: user.username.clone(),
          rating: review.rating,
          comment: review.comment.clone(),
          created_at: review.created_at,
        })
      })
      .collect();
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(reviews)
  }

  async fn delete_review(&self, review_id: i64) -> StoreResult<bool> {
    Ok(self.tables.lock().reviews.remove(&review_id).is_some())
  }

  async fn dashboard_stats(&self, since: DateTime<Utc>) -> StoreResult<DashboardStats> {
    let tables = self.tables.lock();
    let counted_orders: Vec<i64> = tables
      .orders
      .values()
      .filter(|o| o.order_date >= since && o.cancelled_at.is_none() && o.status != OrderStatus::Rejected)
      .map(|o| o.id)
      .collect();
    Ok(DashboardStats {
      new_users_30_days: tables.users.values().filter(|u| u.created_at >= since).count() as i64,
      orders_30_days: tables.orders.values().filter(|o| o.order_date >= since).count() as i64,
      pizzas_sold_30_days: tables
        .order_items
        .values()
        .filter(|item| counted_orders.contains(&item.order_id))
        .map(|item| i64::from(item.quantity))
        .sum(),
      total_active_users: tables.users.values().filter(|u| u.role == Role::Customer).count() as i64,
      pending_orders: tables
        .orders
        .values()
        .filter(|o| o.status == OrderStatus::Pending && o.cancelled_at.is_none())
        .count() as i64,
      total_reviews: tables.reviews.len() as i64,
    })
  }
}
