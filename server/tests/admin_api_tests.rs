// server/tests/admin_api_tests.rs

mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::{json, Value};

use common::*;

fn admin_get(uri: &str, token: &str) -> TestRequest {
  TestRequest::get().uri(uri).insert_header(bearer(token))
}

fn admin_put(uri: &str, token: &str, body: Value) -> TestRequest {
  TestRequest::put().uri(uri).insert_header(bearer(token)).set_json(body)
}

fn admin_delete(uri: &str, token: &str, body: Value) -> TestRequest {
  TestRequest::delete().uri(uri).insert_header(bearer(token)).set_json(body)
}

#[actix_web::test]
async fn admin_routes_require_an_admin_token() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (_, customer_token) = signed_in_customer(&app, "alice", "alice@example.com").await;

  let (status, body) = send(&app, TestRequest::get().uri("/admin/users")).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["errorCode"], "ACCESS_DENIED");

  for uri in ["/admin/users", "/admin/orders", "/admin/reviews", "/admin/stats"] {
    let (status, body) = send(&app, admin_get(uri, &customer_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    assert_eq!(body["errorCode"], "ACCESS_DENIED");
  }

  let (status, _) = send(&app, admin_put("/admin/orders/1/accept", &customer_token, json!({}))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  // Customers cannot use the admin login either.
  let (status, body) = send(
    &app,
    TestRequest::post()
      .uri("/admin/login")
      .set_json(json!({ "email": "alice@example.com", "password": "Secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["errorCode"], "ACCESS_DENIED");
}

#[actix_web::test]
async fn admin_login_issues_an_admin_token() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;

  let token = admin_token(&app).await;
  let claims = shop.state.tokens.verify(&token).expect("token verifies");
  assert!(claims.is_admin());
  assert_eq!(claims.exp - claims.iat, 4 * 3600);

  let (status, body) = send(&app, admin_get("/admin/users", &token)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  let users = body["data"].as_array().unwrap();
  assert_eq!(users.len(), 1);
  assert_eq!(users[0]["role"], "admin");
  assert!(users[0].get("password_hash").is_none());
}

#[actix_web::test]
async fn accept_and_reject_only_apply_to_pending_orders() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (_, alice) = signed_in_customer(&app, "alice", "alice@example.com").await;
  let admin = admin_token(&app).await;

  let (_, body) = place_order(&app, &alice, alice_cart()).await;
  let first = body["data"]["orderId"].as_i64().unwrap();
  let (_, body) = place_order(&app, &alice, alice_cart()).await;
  let second = body["data"]["orderId"].as_i64().unwrap();

  let (status, body) = send(&app, admin_put(&format!("/admin/orders/{}/accept", first), &admin, json!({}))).await;
  assert_eq!(status, StatusCode::OK, "{}", body);
  assert_eq!(body["data"]["status"], "accepted");

  let (status, body) = send(&app, admin_put(&format!("/admin/orders/{}/accept", first), &admin, json!({}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND_OR_ALREADY_HANDLED");

  let (status, body) = send(
    &app,
    admin_put(&format!("/admin/orders/{}/reject", first), &admin, json!({ "reason": "Too late" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND_OR_ALREADY_HANDLED");

  let (status, body) = send(
    &app,
    admin_put(&format!("/admin/orders/{}/reject", second), &admin, json!({ "reason": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "MISSING_FIELDS");

  let (status, body) = send(
    &app,
    admin_put(
      &format!("/admin/orders/{}/reject", second),
      &admin,
      json!({ "reason": "Out of ingredients" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{}", body);
  assert_eq!(body["data"]["rejection_reason"], "Out of ingredients");

  // The second reject finds no pending row.
  let (status, body) = send(
    &app,
    admin_put(
      &format!("/admin/orders/{}/reject", second),
      &admin,
      json!({ "reason": "Out of ingredients" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND_OR_ALREADY_HANDLED");

  let (status, body) = send(&app, admin_put("/admin/orders/9999/accept", &admin, json!({}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND_OR_ALREADY_HANDLED");

  let (_, body) = send(&app, admin_get("/admin/orders", &admin)).await;
  let orders = body["data"].as_array().unwrap();
  assert_eq!(orders.len(), 2);
  // newest first
  assert_eq!(orders[0]["id"], second);
  assert_eq!(orders[0]["status"], "rejected");
  assert_eq!(orders[0]["rejection_reason"], "Out of ingredients");
  assert_eq!(orders[0]["customer_username"], "alice");
  assert!(orders[0]["status_updated_at"].is_string());
  assert_eq!(orders[1]["status"], "accepted");
  assert_eq!(orders[1]["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn cancelled_orders_cannot_be_accepted() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (_, alice) = signed_in_customer(&app, "alice", "alice@example.com").await;
  let admin = admin_token(&app).await;

  let (_, body) = place_order(&app, &alice, alice_cart()).await;
  let order_id = body["data"]["orderId"].as_i64().unwrap();
  send(
    &app,
    TestRequest::put()
      .uri(&format!("/api/orders/{}/cancel", order_id))
      .insert_header(bearer(&alice)),
  )
  .await;

  let (status, body) = send(&app, admin_put(&format!("/admin/orders/{}/accept", order_id), &admin, json!({}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND_OR_ALREADY_HANDLED");
}

#[actix_web::test]
async fn user_management_protects_the_admin_and_unique_identities() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (alice_id, _) = signed_in_customer(&app, "alice", "alice@example.com").await;
  signed_in_customer(&app, "bob", "bob@example.com").await;
  let admin = admin_token(&app).await;
  let admin_id = shop.state.tokens.verify(&admin).unwrap().user_id;

  let (status, body) = send(
    &app,
    admin_put(
      &format!("/admin/users/{}", alice_id),
      &admin,
      json!({ "username": "alice_b", "email": "Alice.B@example.com" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{}", body);
  assert_eq!(body["data"]["username"], "alice_b");
  assert_eq!(body["data"]["email"], "alice.b@example.com");

  let (status, body) = send(
    &app,
    admin_put(
      &format!("/admin/users/{}", alice_id),
      &admin,
      json!({ "username": "alice_b", "email": "bob@example.com" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["errorCode"], "EMAIL_EXISTS");

  let (status, body) = send(
    &app,
    admin_put(
      &format!("/admin/users/{}", alice_id),
      &admin,
      json!({ "username": "alice_b", "email": "broken" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["errorCode"], "INVALID_EMAIL");

  let (status, body) = send(
    &app,
    admin_put(
      &format!("/admin/users/{}", admin_id),
      &admin,
      json!({ "username": "root", "email": "root@example.com" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["errorCode"], "ACCESS_DENIED");

  let (status, _) = send(
    &app,
    admin_delete(&format!("/admin/users/{}", admin_id), &admin, json!({ "reason": "cleanup" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = send(
    &app,
    admin_put("/admin/users/abc", &admin, json!({ "username": "x_y_z", "email": "x@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "INVALID_REQUEST");
}

#[actix_web::test]
async fn deleting_a_user_needs_a_reason_and_removes_their_data() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (alice_id, alice) = signed_in_customer(&app, "alice", "alice@example.com").await;
  let admin = admin_token(&app).await;

  place_order(&app, &alice, alice_cart()).await;
  send(
    &app,
    TestRequest::post()
      .uri("/api/reviews")
      .insert_header(bearer(&alice))
      .set_json(json!({ "rating": 4, "comment": "Nice" })),
  )
  .await;

  let (status, body) = send(&app, admin_delete(&format!("/admin/users/{}", alice_id), &admin, json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "MISSING_FIELDS");

  let (status, body) = send(
    &app,
    admin_delete(&format!("/admin/users/{}", alice_id), &admin, json!({ "reason": "Spam account" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{}", body);
  assert_eq!(body["data"]["reason"], "Spam account");

  assert_eq!(shop.store.order_count(), 0);
  let (_, reviews) = send(&app, TestRequest::get().uri("/api/reviews")).await;
  assert_eq!(reviews, json!([]));

  let (status, body) = send(
    &app,
    admin_delete(&format!("/admin/users/{}", alice_id), &admin, json!({ "reason": "again" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND");
}

#[actix_web::test]
async fn review_moderation_requires_a_reason() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (_, alice) = signed_in_customer(&app, "alice", "alice@example.com").await;
  let admin = admin_token(&app).await;

  let (_, body) = send(
    &app,
    TestRequest::post()
      .uri("/api/reviews")
      .insert_header(bearer(&alice))
      .set_json(json!({ "rating": 1, "comment": "Cold pizza" })),
  )
  .await;
  let review_id = body["data"]["reviewId"].as_i64().unwrap();

  let (_, body) = send(&app, admin_get("/admin/reviews", &admin)).await;
  assert_eq!(body["data"][0]["username"], "alice");

  let (status, body) = send(&app, admin_delete(&format!("/admin/reviews/{}", review_id), &admin, json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "MISSING_FIELDS");

  let (status, body) = send(
    &app,
    admin_delete(
      &format!("/admin/reviews/{}", review_id),
      &admin,
      json!({ "reason": "Offensive language" }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{}", body);
  assert_eq!(body["data"]["reason"], "Offensive language");

  let (status, body) = send(
    &app,
    admin_delete(&format!("/admin/reviews/{}", review_id), &admin, json!({ "reason": "again" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errorCode"], "NOT_FOUND");
}

#[actix_web::test]
async fn dashboard_stats_count_recent_activity() {
  let shop = shop().await;
  let app = init_app(shop.state.clone()).await;
  let (_, alice) = signed_in_customer(&app, "alice", "alice@example.com").await;
  signed_in_customer(&app, "bob", "bob@example.com").await;
  let admin = admin_token(&app).await;

  place_order(&app, &alice, alice_cart()).await;
  let (_, body) = place_order(&app, &alice, alice_cart()).await;
  let cancelled = body["data"]["orderId"].as_i64().unwrap();
  send(
    &app,
    TestRequest::put()
      .uri(&format!("/api/orders/{}/cancel", cancelled))
      .insert_header(bearer(&alice)),
  )
  .await;

  let (status, body) = send(&app, admin_get("/admin/stats", &admin)).await;
  assert_eq!(status, StatusCode::OK, "{}", body);
  let stats = &body["data"];
  assert_eq!(stats["new_users_30_days"], 3);
  assert_eq!(stats["total_active_users"], 2);
  assert_eq!(stats["orders_30_days"], 2);
  assert_eq!(stats["pending_orders"], 1);
  // Only the live order's two pizzas count as sold.
  assert_eq!(stats["pizzas_sold_30_days"], 2);
  assert_eq!(stats["total_reviews"], 0);
}
