//! `coffeeshop-core`: drink domain model.
//!
//! This crate contains **pure domain** types (no HTTP, no storage).

pub mod drink;
pub mod error;
pub mod id;
pub mod recipe;

pub use drink::{Drink, DrinkPatch, LongDrink, NewDrink, ShortDrink, MAX_TITLE_LEN};
pub use error::{DomainError, DomainResult};
pub use id::DrinkId;
pub use recipe::{Ingredient, Recipe, RecipeInput, ShortIngredient};
