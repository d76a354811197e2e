// server/src/models/mod.rs

//! Rows and value types shared by the store, the services and the handlers.

pub mod ingredient;
pub mod money;
pub mod order;
pub mod order_item;
pub mod pizza;
pub mod review;
pub mod user;

pub use ingredient::{Ingredient, IngredientCategory, IngredientView};
pub use order::{AdminOrderRow, NewOrder, Order, OrderStatus, CANCELLATION_MARKER};
pub use order_item::{ItemLabel, NewOrderItem, OrderItemRow, SelectedIngredient};
pub use pizza::{Pizza, PizzaView};
pub use review::{NewReview, Review, ReviewWithAuthor};
pub use user::{NewUser, PublicUser, Role, User};
