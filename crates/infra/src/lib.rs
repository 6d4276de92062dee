//! Infrastructure layer: drink persistence and signing-key retrieval.

pub mod drink_store;
pub mod jwks;

pub use drink_store::{DrinkStore, InMemoryDrinkStore, PostgresDrinkStore, StoreError};
pub use jwks::JwksKeyProvider;
