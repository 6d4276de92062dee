//! Drink persistence abstractions.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDrinkStore;
pub use postgres::PostgresDrinkStore;
pub use r#trait::{seed_drinks, DrinkStore, StoreError};
