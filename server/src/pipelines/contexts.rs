// server/src/pipelines/contexts.rs

//! Data carried through each pipeline run, wrapped in `ContextData` by the handlers.

use crate::models::{Order, User};
use crate::services::pricing::{CartItem, PricedCart};
use crate::state::AppState;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub username: String,
  pub email: String,
  pub password: String,
  pub password_hash: Option<String>,
  pub created_user: Option<User>,
}

impl SignupCtxData {
  pub fn new(app_state: AppState, username: String, email: String, password: String) -> Self {
    Self {
      app_state,
      username,
      email,
      password,
      password_hash: None,
      created_user: None,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  /// Rate limiter key, the caller's IP.
  pub client_key: String,
  /// The admin panel login refuses non-admin accounts and issues longer tokens.
  pub admin_only: bool,
  /// Set once the limiter has reserved an attempt that the handler must settle.
  pub attempt_reserved: bool,
  pub user: Option<User>,
  pub session_token: Option<String>,
}

impl SigninCtxData {
  pub fn new(app_state: AppState, email: String, password: String, client_key: String, admin_only: bool) -> Self {
    Self {
      app_state,
      email,
      password,
      client_key,
      admin_only,
      attempt_reserved: false,
      user: None,
      session_token: None,
    }
  }
}

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub user_id: i64,
  pub items: Vec<CartItem>,
  pub delivery_address: String,
  pub claimed_total: Option<f64>,
  pub priced: Option<PricedCart>,
  pub created_order: Option<Order>,
  pub rolled_back: bool,
}

impl PlaceOrderCtxData {
  pub fn new(
    app_state: AppState,
    user_id: i64,
    items: Vec<CartItem>,
    delivery_address: String,
    claimed_total: Option<f64>,
  ) -> Self {
    Self {
      app_state,
      user_id,
      items,
      delivery_address,
      claimed_total,
      priced: None,
      created_order: None,
      rolled_back: false,
    }
  }
}
