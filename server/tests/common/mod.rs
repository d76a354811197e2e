// server/tests/common/mod.rs
#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use pizzeria_server::config::AppConfig;
use pizzeria_server::services::admin_service;
use pizzeria_server::state::AppState;
use pizzeria_server::store::{MemoryStore, ShopStore};
use pizzeria_server::web::configure_app_routes;

pub const ADMIN_EMAIL: &str = "admin@pizzashop.local";
pub const ADMIN_PASSWORD: &str = "AdminPass1";

/// Test configuration: cheap argon2 cost, fixed secret, bootstrap admin enabled.
pub fn test_config_with(overrides: &[(&str, &str)]) -> AppConfig {
  let overrides: Vec<(String, String)> = overrides
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
  AppConfig::from_lookup(move |name| {
    if let Some((_, v)) = overrides.iter().find(|(k, _)| k == name) {
      return Some(v.clone());
    }
    let value = match name {
      "JWT_SECRET" => "integration-test-secret",
      "PASSWORD_HASH_MEMORY_KIB" => "64",
      "PASSWORD_HASH_ITERATIONS" => "1",
      "ADMIN_EMAIL" => ADMIN_EMAIL,
      "ADMIN_PASSWORD" => ADMIN_PASSWORD,
      _ => return None,
    };
    Some(value.to_string())
  })
  .expect("test configuration is valid")
}

pub struct TestShop {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
}

pub async fn shop_with(overrides: &[(&str, &str)]) -> TestShop {
  let config = test_config_with(overrides);
  let store = Arc::new(MemoryStore::with_default_catalog());
  admin_service::ensure_admin_account(store.as_ref(), &config)
    .await
    .expect("admin bootstrap succeeds");
  let state = AppState::new(store.clone() as Arc<dyn ShopStore>, config);
  TestShop { state, store }
}

pub async fn shop() -> TestShop {
  shop_with(&[]).await
}

pub async fn init_app(
  state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
  test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await
}

pub fn peer() -> SocketAddr {
  "10.1.2.3:40000".parse().expect("valid socket address")
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Sends the request and returns the status with the parsed JSON body (`Null` when empty).
pub async fn send(
  app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
  req: TestRequest,
) -> (StatusCode, Value) {
  let resp = test::call_service(app, req.peer_addr(peer()).to_request()).await;
  let status = resp.status();
  let body = test::read_body(resp).await;
  let json = if body.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&body).expect("response body is JSON")
  };
  (status, json)
}

pub async fn register(
  app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
  username: &str,
  email: &str,
  password: &str,
) -> (StatusCode, Value) {
  send(
    app,
    TestRequest::post()
      .uri("/api/register")
      .set_json(json!({ "username": username, "email": email, "password": password })),
  )
  .await
}

pub async fn login(
  app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
  email: &str,
  password: &str,
) -> (StatusCode, Value) {
  send(
    app,
    TestRequest::post()
      .uri("/api/login")
      .set_json(json!({ "email": email, "password": password })),
  )
  .await
}

/// Registers and signs in; returns `(user_id, token)`.
pub async fn signed_in_customer(
  app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
  username: &str,
  email: &str,
) -> (i64, String) {
  let (status, body) = register(app, username, email, "Secret1").await;
  assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
  let (status, body) = login(app, email, "Secret1").await;
  assert_eq!(status, StatusCode::OK, "login failed: {}", body);
  (
    body["user"]["id"].as_i64().expect("user id"),
    body["token"].as_str().expect("token").to_string(),
  )
}

pub async fn admin_token(
  app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
) -> String {
  let (status, body) = send(
    app,
    TestRequest::post()
      .uri("/admin/login")
      .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
  body["data"]["token"].as_str().expect("admin token").to_string()
}

/// One Margherita (9.50) and one custom pizza with sauce and cheese (7.00).
/// The cart exactly as the storefront builds it: a menu pizza, and a custom
/// pizza carrying the builder's placeholder pizza object.
pub fn alice_cart() -> Value {
  json!({
    "items": [
      {
        "pizza": { "id": 1, "name": "Margherita", "base_price": 9.50 },
        "customIngredients": null,
        "price": 9.50,
        "quantity": 1
      },
      {
        "pizza": { "id": "custom", "name": "Custom Pizza", "base_price": 7.00 },
        "customIngredients": [
          { "id": 1, "name": "Tomato Sauce", "price": 0.00, "category": "sauce" },
          { "id": 2, "name": "Mozzarella", "price": 0.00, "category": "cheese" }
        ],
        "price": 7.00,
        "quantity": 1
      }
    ],
    "deliveryAddress": "Hauptstraße 1, 10115 Berlin",
    "totalPrice": 16.50
  })
}

pub async fn place_order(
  app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
  token: &str,
  cart: Value,
) -> (StatusCode, Value) {
  send(
    app,
    TestRequest::post()
      .uri("/api/orders")
      .insert_header(bearer(token))
      .set_json(cart),
  )
  .await
}
