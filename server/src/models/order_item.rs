// server/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const CUSTOM_PIZZA_NAME: &str = "Custom Pizza";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedIngredient {
  pub id: i64,
  pub name: String,
}

/// What a line item was, stored as JSON next to the item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemLabel {
  RegularPizza {
    pizza_id: i64,
    pizza_name: String,
  },
  CustomPizza {
    pizza_name: String,
    #[serde(rename = "selectedIngredients")]
    selected_ingredients: Vec<SelectedIngredient>,
  },
}

impl ItemLabel {
  pub fn custom(selected_ingredients: Vec<SelectedIngredient>) -> Self {
    ItemLabel::CustomPizza {
      pizza_name: CUSTOM_PIZZA_NAME.to_string(),
      selected_ingredients,
    }
  }

  /// Catalog name for regular pizzas; "Custom Pizza (a, b)" for custom ones.
  pub fn display_name(&self) -> String {
    match self {
      ItemLabel::RegularPizza { pizza_name, .. } => pizza_name.clone(),
      ItemLabel::CustomPizza {
        pizza_name,
        selected_ingredients,
      } => {
        if selected_ingredients.is_empty() {
          pizza_name.clone()
        } else {
          let names: Vec<&str> = selected_ingredients.iter().map(|i| i.name.as_str()).collect();
          format!("{} ({})", pizza_name, names.join(", "))
        }
      }
    }
  }
}

/// An item row as read back, with the catalog name from the pizza join.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
  pub id: i64,
  pub order_id: i64,
  pub pizza_id: Option<i64>,
  pub custom_ingredients: Option<serde_json::Value>,
  pub quantity: i32,
  pub item_price_cents: i64,
  pub catalog_pizza_name: Option<String>,
}

impl OrderItemRow {
  /// Stored label first, then the joined catalog name, then a plain "Pizza".
  pub fn display_name(&self) -> String {
    let label = self
      .custom_ingredients
      .as_ref()
      .and_then(|raw| serde_json::from_value::<ItemLabel>(raw.clone()).ok());
    match label {
      Some(label) => label.display_name(),
      None => self.catalog_pizza_name.clone().unwrap_or_else(|| "Pizza".to_string()),
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
  /// `None` marks a custom pizza.
  pub pizza_id: Option<i64>,
  pub label: ItemLabel,
  pub quantity: i32,
  pub item_price_cents: i64,
}
