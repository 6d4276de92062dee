use async_trait::async_trait;
use thiserror::Error;

use coffeeshop_core::{
    DomainError, DomainResult, Drink, DrinkId, DrinkPatch, Ingredient, NewDrink, Recipe,
};

/// Store-level errors.
///
/// - **NotFound**: no drink with the requested id
/// - **Conflict**: a uniqueness rule (drink title) was violated
/// - **Corrupt**: a stored row no longer parses into a drink
/// - **Backend**: the database or lock failed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("drink not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("corrupt drink row: {0}")]
    Corrupt(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// Domain failures inside the store mean stored or seeded data is unusable.
impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        StoreError::Corrupt(value.to_string())
    }
}

/// Persistent collection of drinks.
///
/// Mutations are atomic: either the whole change lands or the store is left
/// as it was.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks, ordered by id.
    async fn list(&self) -> Result<Vec<Drink>, StoreError>;

    async fn get(&self, id: DrinkId) -> Result<Option<Drink>, StoreError>;

    /// Insert a drink and return it with its newly assigned id.
    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// Apply `patch` to an existing drink. `NotFound` if `id` is unknown.
    async fn update(&self, id: DrinkId, patch: &DrinkPatch) -> Result<Drink, StoreError>;

    /// Remove a drink. `NotFound` if `id` is unknown.
    async fn delete(&self, id: DrinkId) -> Result<(), StoreError>;

    /// Drop every drink and start over with [`seed_drinks`].
    async fn reset(&self) -> Result<(), StoreError>;
}

/// Initial contents after a reset.
pub fn seed_drinks() -> DomainResult<Vec<NewDrink>> {
    let water = NewDrink::new(
        "water",
        Recipe::new(vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }]),
    )?;
    Ok(vec![water])
}
