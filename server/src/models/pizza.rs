// server/src/models/pizza.rs

use serde::Serialize;
use sqlx::FromRow;

use super::money;

#[derive(Debug, Clone, FromRow)]
pub struct Pizza {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub base_price_cents: i64,
}

/// Catalog entry as the storefront reads it.
#[derive(Debug, Clone, Serialize)]
pub struct PizzaView {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub base_price: f64,
  pub image: &'static str,
}

impl From<&Pizza> for PizzaView {
  fn from(pizza: &Pizza) -> Self {
    PizzaView {
      id: pizza.id,
      name: pizza.name.clone(),
      description: pizza.description.clone(),
      base_price: money::to_decimal(pizza.base_price_cents),
      image: image_for(&pizza.name),
    }
  }
}

/// Maps a pizza name onto one of the bundled storefront images.
pub fn image_for(name: &str) -> &'static str {
  let name = name.to_lowercase();
  if name.contains("margherita") {
    "pizza_magherita.png"
  } else if name.contains("funghi") {
    "pizza_funghi.png"
  } else if name.contains("hawaii") {
    "pizza_hawaii.png"
  } else if name.contains("salami") {
    "pizza_salami.png"
  } else if name.contains("döner") || name.contains("doner") {
    "pizza_doner.png"
  } else {
    "pizza_custom.png"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn images_follow_the_pizza_name() {
    assert_eq!(image_for("Pizza Margherita"), "pizza_magherita.png");
    assert_eq!(image_for("DÖNER Spezial"), "pizza_doner.png");
    assert_eq!(image_for("Doner"), "pizza_doner.png");
    assert_eq!(image_for("Quattro Formaggi"), "pizza_custom.png");
  }
}
