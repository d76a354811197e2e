// server/src/web/routes.rs

use actix_web::{error, web, HttpRequest};

use crate::errors::{AppError, ErrorCode};
use crate::web::handlers::{
  admin_handlers, auth_handlers, catalog_handlers, order_handlers, review_handlers,
};

fn invalid_request(message: String) -> error::Error {
  AppError::BadRequest {
    message,
    code: ErrorCode::InvalidRequest,
  }
  .into()
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
  invalid_request(format!("Invalid JSON body: {}", err))
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> error::Error {
  invalid_request(format!("Invalid path parameter: {}", err))
}

/// Registers every route plus the extractor error handlers.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(catalog_handlers::health_handler))
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler))
        .route("/pizzas", web::get().to(catalog_handlers::list_pizzas_handler))
        .route("/ingredients", web::get().to(catalog_handlers::list_ingredients_handler))
        .service(
          web::resource("/reviews")
            .route(web::get().to(review_handlers::list_reviews_handler))
            .route(web::post().to(review_handlers::create_review_handler)),
        )
        .route("/orders", web::post().to(order_handlers::create_order_handler))
        // GET takes a user id, DELETE an order id.
        .service(
          web::resource("/orders/{id}")
            .route(web::get().to(order_handlers::list_orders_handler))
            .route(web::delete().to(order_handlers::delete_order_handler)),
        )
        .route("/orders/{id}/cancel", web::put().to(order_handlers::cancel_order_handler)),
    )
    .service(
      web::scope("/admin")
        .route("/login", web::post().to(auth_handlers::admin_login_handler))
        .route("/stats", web::get().to(admin_handlers::stats_handler))
        .route("/users", web::get().to(admin_handlers::list_users_handler))
        .service(
          web::resource("/users/{id}")
            .route(web::put().to(admin_handlers::update_user_handler))
            .route(web::delete().to(admin_handlers::delete_user_handler)),
        )
        .route("/orders", web::get().to(admin_handlers::list_orders_handler))
        .route("/orders/{id}/accept", web::put().to(admin_handlers::accept_order_handler))
        .route("/orders/{id}/reject", web::put().to(admin_handlers::reject_order_handler))
        .route("/reviews", web::get().to(admin_handlers::list_reviews_handler))
        .route("/reviews/{id}", web::delete().to(admin_handlers::delete_review_handler)),
    );
}
