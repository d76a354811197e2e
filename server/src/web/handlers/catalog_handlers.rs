// server/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::models::{IngredientView, PizzaView};
use crate::state::AppState;

pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[instrument(name = "handler::list_pizzas", skip(app_state))]
pub async fn list_pizzas_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let pizzas = app_state.store.list_pizzas().await?;
  debug!(count = pizzas.len(), "Listing pizzas.");
  let views: Vec<PizzaView> = pizzas.iter().map(PizzaView::from).collect();
  Ok(HttpResponse::Ok().json(views))
}

#[instrument(name = "handler::list_ingredients", skip(app_state))]
pub async fn list_ingredients_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let ingredients = app_state.store.list_ingredients().await?;
  debug!(count = ingredients.len(), "Listing ingredients.");
  let views: Vec<IngredientView> = ingredients.iter().map(IngredientView::from).collect();
  Ok(HttpResponse::Ok().json(views))
}
