// server/src/models/ingredient.rs

use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};

use super::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "ingredient_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
  Sauce,
  Cheese,
  Meat,
  Vegetable,
  Other,
}

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
  pub id: i64,
  pub name: String,
  pub price_cents: i64,
  pub category: IngredientCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
  pub id: i64,
  pub name: String,
  pub price: f64,
  pub category: IngredientCategory,
}

impl From<&Ingredient> for IngredientView {
  fn from(ingredient: &Ingredient) -> Self {
    IngredientView {
      id: ingredient.id,
      name: ingredient.name.clone(),
      price: money::to_decimal(ingredient.price_cents),
      category: ingredient.category,
    }
  }
}
