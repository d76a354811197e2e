// server/src/services/pricing.rs

//! Turns a client cart into priced order items.
//!
//! Client prices are never stored. Every item is priced from the catalog and
//! the client's figures are only compared against ours, one cent of slack
//! allowed for float rounding on the client side.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::errors::{AppError, ErrorCode};
use crate::models::{money, Ingredient, ItemLabel, NewOrderItem, Pizza, SelectedIngredient};

pub const PRICE_TOLERANCE_CENTS: u64 = 1;

/// Catalog pizzas carry their numeric id. The storefront's builder sends its
/// custom pizza with a placeholder such as `"custom"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PizzaId {
  Catalog(i64),
  Placeholder(String),
}

impl fmt::Display for PizzaId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PizzaId::Catalog(id) => write!(f, "{}", id),
      PizzaId::Placeholder(label) => write!(f, "'{}'", label),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PizzaRef {
  pub id: PizzaId,
  #[serde(default)]
  pub name: Option<String>,
}

/// The storefront sends ingredients either as bare ids or as catalog objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IngredientRef {
  Id(i64),
  Entry { id: i64 },
}

impl IngredientRef {
  pub fn id(&self) -> i64 {
    match self {
      IngredientRef::Id(id) | IngredientRef::Entry { id } => *id,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
  #[serde(default)]
  pub pizza: Option<PizzaRef>,
  #[serde(default, rename = "customIngredients")]
  pub custom_ingredients: Option<Vec<IngredientRef>>,
  #[serde(default)]
  pub quantity: Option<i32>,
  #[serde(default, alias = "itemPrice", alias = "price")]
  pub item_price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PricedCart {
  pub items: Vec<NewOrderItem>,
  pub total_cents: i64,
}

pub struct Catalog<'a> {
  pizzas: HashMap<i64, &'a Pizza>,
  ingredients: HashMap<i64, &'a Ingredient>,
  custom_base_cents: i64,
}

impl<'a> Catalog<'a> {
  pub fn new(pizzas: &'a [Pizza], ingredients: &'a [Ingredient], custom_base_cents: i64) -> Self {
    Self {
      pizzas: pizzas.iter().map(|p| (p.id, p)).collect(),
      ingredients: ingredients.iter().map(|i| (i.id, i)).collect(),
      custom_base_cents,
    }
  }

  fn price_item(&self, index: usize, item: &CartItem) -> Result<NewOrderItem, AppError> {
    let quantity = match item.quantity {
      Some(q) if q >= 1 => q,
      Some(q) => {
        return Err(AppError::BadRequest {
          message: format!("Item {}: quantity must be at least 1 (got {})", index + 1, q),
          code: ErrorCode::InvalidQuantity,
        })
      }
      None => return Err(AppError::missing_fields(format!("Item {}: quantity is required", index + 1))),
    };

    // An ingredient list makes the item a custom pizza whatever `pizza` says.
    let (pizza_id, label, unit_cents) = if let Some(refs) = &item.custom_ingredients {
      let mut selected = Vec::with_capacity(refs.len());
      let mut unit = self.custom_base_cents;
      for r in refs {
        let ingredient = self
          .ingredients
          .get(&r.id())
          .ok_or_else(|| AppError::NotFound(format!("Ingredient {} does not exist", r.id())))?;
        unit += ingredient.price_cents;
        selected.push(SelectedIngredient {
          id: ingredient.id,
          name: ingredient.name.clone(),
        });
      }
      (None, ItemLabel::custom(selected), unit)
    } else if let Some(pizza_ref) = &item.pizza {
      let pizza = match &pizza_ref.id {
        PizzaId::Catalog(id) => self.pizzas.get(id),
        PizzaId::Placeholder(_) => None,
      }
      .ok_or_else(|| AppError::NotFound(format!("Pizza {} does not exist", pizza_ref.id)))?;
      let label = ItemLabel::RegularPizza {
        pizza_id: pizza.id,
        pizza_name: pizza.name.clone(),
      };
      (Some(pizza.id), label, pizza.base_price_cents)
    } else {
      return Err(AppError::missing_fields(format!(
        "Item {}: either a pizza or a list of ingredients is required",
        index + 1
      )));
    };

    if let Some(claimed) = item.item_price {
      let claimed_cents = money::cents_from_decimal(claimed)
        .ok_or_else(|| AppError::PriceMismatch(format!("Item {}: price is not a valid amount", index + 1)))?;
      if claimed_cents.abs_diff(unit_cents) > PRICE_TOLERANCE_CENTS {
        return Err(AppError::PriceMismatch(format!(
          "Item {} ({}): expected {} but got {}",
          index + 1,
          label.display_name(),
          money::format_cents(unit_cents),
          money::format_cents(claimed_cents)
        )));
      }
    }

    Ok(NewOrderItem {
      pizza_id,
      label,
      quantity,
      item_price_cents: unit_cents,
    })
  }

  /// Prices every item and checks the claimed total against the sum.
  pub fn price_cart(&self, items: &[CartItem], claimed_total: Option<f64>) -> Result<PricedCart, AppError> {
    if items.is_empty() {
      return Err(AppError::missing_fields("Order items and total price are required"));
    }
    let claimed_total_cents = claimed_total
      .and_then(money::cents_from_decimal)
      .filter(|cents| *cents > 0)
      .ok_or_else(|| AppError::missing_fields("Order items and a positive total price are required"))?;

    let priced = items
      .iter()
      .enumerate()
      .map(|(idx, item)| self.price_item(idx, item))
      .collect::<Result<Vec<_>, _>>()?;
    let total_cents: i64 = priced
      .iter()
      .map(|item| item.item_price_cents * i64::from(item.quantity))
      .sum();

    if claimed_total_cents.abs_diff(total_cents) > PRICE_TOLERANCE_CENTS {
      return Err(AppError::PriceMismatch(format!(
        "Order total should be {} but {} was submitted",
        money::format_cents(total_cents),
        money::format_cents(claimed_total_cents)
      )));
    }

    Ok(PricedCart {
      items: priced,
      total_cents,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::IngredientCategory;
  use serde_json::json;

  fn catalog_rows() -> (Vec<Pizza>, Vec<Ingredient>) {
    let pizzas = vec![Pizza {
      id: 1,
      name: "Margherita".to_string(),
      description: None,
      base_price_cents: 950,
    }];
    let ingredients = vec![
      Ingredient {
        id: 1,
        name: "Tomato Sauce".to_string(),
        price_cents: 0,
        category: IngredientCategory::Sauce,
      },
      Ingredient {
        id: 2,
        name: "Mozzarella".to_string(),
        price_cents: 0,
        category: IngredientCategory::Cheese,
      },
      Ingredient {
        id: 5,
        name: "Salami".to_string(),
        price_cents: 150,
        category: IngredientCategory::Meat,
      },
    ];
    (pizzas, ingredients)
  }

  fn cart(value: serde_json::Value) -> Vec<CartItem> {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn regular_and_custom_items_are_priced_from_the_catalog() {
    let (pizzas, ingredients) = catalog_rows();
    let catalog = Catalog::new(&pizzas, &ingredients, 700);
    let items = cart(json!([
      {"pizza": {"id": 1, "name": "Margherita"}, "customIngredients": null, "quantity": 1, "item_price": 9.5},
      {"customIngredients": [{"id": 1, "name": "Tomato Sauce"}, 2], "quantity": 1, "price": 7.0}
    ]));
    let priced = catalog.price_cart(&items, Some(16.5)).unwrap();
    assert_eq!(priced.total_cents, 1650);
    assert_eq!(priced.items[0].pizza_id, Some(1));
    assert_eq!(priced.items[1].pizza_id, None);
    assert_eq!(priced.items[1].label.display_name(), "Custom Pizza (Tomato Sauce, Mozzarella)");
  }

  #[test]
  fn storefront_custom_pizza_with_placeholder_id_is_priced_from_ingredients() {
    let (pizzas, ingredients) = catalog_rows();
    let catalog = Catalog::new(&pizzas, &ingredients, 700);
    let items = cart(json!([
      {"pizza": {"id": 1, "name": "Margherita", "base_price": 9.5}, "customIngredients": null, "price": 9.5, "quantity": 1},
      {
        "pizza": {"id": "custom", "name": "Custom Pizza", "base_price": 7.0},
        "customIngredients": [{"id": 1, "name": "Tomato Sauce", "price": 0.0}, {"id": 5, "name": "Salami", "price": 1.5}],
        "price": 8.5,
        "quantity": 2
      }
    ]));
    let priced = catalog.price_cart(&items, Some(26.5)).unwrap();
    assert_eq!(priced.total_cents, 2650);
    assert_eq!(priced.items[1].pizza_id, None);
    assert_eq!(priced.items[1].item_price_cents, 850);

    // Without ingredients a placeholder id names no catalog pizza.
    let placeholder_only = cart(json!([{"pizza": {"id": "custom"}, "quantity": 1}]));
    assert_eq!(
      catalog.price_cart(&placeholder_only, Some(7.0)).unwrap_err().code(),
      ErrorCode::NotFound
    );
  }

  #[test]
  fn absurd_amounts_are_a_price_mismatch() {
    let (pizzas, ingredients) = catalog_rows();
    let catalog = Catalog::new(&pizzas, &ingredients, 700);
    let items = cart(json!([{"pizza": {"id": 1}, "quantity": 1, "item_price": -1e300}]));
    assert!(matches!(catalog.price_cart(&items, Some(9.5)), Err(AppError::PriceMismatch(_))));

    let items = cart(json!([{"pizza": {"id": 1}, "quantity": 1, "item_price": 1e18}]));
    assert!(matches!(catalog.price_cart(&items, Some(9.5)), Err(AppError::PriceMismatch(_))));

    let items = cart(json!([{"pizza": {"id": 1}, "quantity": 1}]));
    assert_eq!(catalog.price_cart(&items, Some(1e300)).unwrap_err().code(), ErrorCode::MissingFields);
  }

  #[test]
  fn quantities_multiply_into_the_total() {
    let (pizzas, ingredients) = catalog_rows();
    let catalog = Catalog::new(&pizzas, &ingredients, 700);
    let items = cart(json!([{"customIngredients": [5], "quantity": 3}]));
    assert_eq!(catalog.price_cart(&items, Some(25.5)).unwrap().total_cents, 2550);
  }

  #[test]
  fn tampered_prices_are_rejected() {
    let (pizzas, ingredients) = catalog_rows();
    let catalog = Catalog::new(&pizzas, &ingredients, 700);

    let cheap_item = cart(json!([{"pizza": {"id": 1}, "quantity": 1, "item_price": 0.5}]));
    assert!(matches!(catalog.price_cart(&cheap_item, Some(0.5)), Err(AppError::PriceMismatch(_))));

    let cheap_total = cart(json!([{"pizza": {"id": 1}, "quantity": 2}]));
    assert!(matches!(catalog.price_cart(&cheap_total, Some(9.5)), Err(AppError::PriceMismatch(_))));

    // One cent of float noise is fine.
    assert!(catalog.price_cart(&cheap_total, Some(18.99)).is_ok());
  }

  #[test]
  fn malformed_carts_get_specific_errors() {
    let (pizzas, ingredients) = catalog_rows();
    let catalog = Catalog::new(&pizzas, &ingredients, 700);

    let err = catalog.price_cart(&[], Some(9.5)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingFields);

    let one = cart(json!([{"pizza": {"id": 1}, "quantity": 1}]));
    assert_eq!(catalog.price_cart(&one, None).unwrap_err().code(), ErrorCode::MissingFields);
    assert_eq!(catalog.price_cart(&one, Some(0.0)).unwrap_err().code(), ErrorCode::MissingFields);

    let zero_qty = cart(json!([{"pizza": {"id": 1}, "quantity": 0}]));
    assert_eq!(catalog.price_cart(&zero_qty, Some(9.5)).unwrap_err().code(), ErrorCode::InvalidQuantity);

    let nothing = cart(json!([{"quantity": 1}]));
    assert_eq!(catalog.price_cart(&nothing, Some(9.5)).unwrap_err().code(), ErrorCode::MissingFields);

    let unknown = cart(json!([{"pizza": {"id": 99}, "quantity": 1}]));
    assert_eq!(catalog.price_cart(&unknown, Some(9.5)).unwrap_err().code(), ErrorCode::NotFound);

    let unknown_ingredient = cart(json!([{"customIngredients": [42], "quantity": 1}]));
    assert_eq!(
      catalog.price_cart(&unknown_ingredient, Some(7.0)).unwrap_err().code(),
      ErrorCode::NotFound
    );
  }
}
