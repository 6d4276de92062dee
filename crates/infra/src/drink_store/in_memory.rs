use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use coffeeshop_core::{Drink, DrinkId, DrinkPatch, NewDrink};

use super::r#trait::{seed_drinks, DrinkStore, StoreError};

#[derive(Debug)]
struct State {
    next_id: i64,
    drinks: BTreeMap<DrinkId, Drink>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_id: 1,
            drinks: BTreeMap::new(),
        }
    }
}

impl State {
    fn title_taken(&self, title: &str, except: Option<DrinkId>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }

    fn insert(&mut self, drink: NewDrink) -> Result<Drink, StoreError> {
        if self.title_taken(drink.title(), None) {
            return Err(StoreError::Conflict(format!(
                "a drink titled '{}' already exists",
                drink.title()
            )));
        }

        let id = DrinkId::new(self.next_id);
        self.next_id += 1;

        let drink = drink.into_drink(id);
        self.drinks.insert(id, drink.clone());
        Ok(drink)
    }
}

/// In-memory drink store.
///
/// Intended for tests/dev. Ids are never reused, even after a delete.
#[derive(Debug, Default)]
pub struct InMemoryDrinkStore {
    state: RwLock<State>,
}

impl InMemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }
}

#[async_trait]
impl DrinkStore for InMemoryDrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.drinks.values().cloned().collect())
    }

    async fn get(&self, id: DrinkId) -> Result<Option<Drink>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.drinks.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let mut state = self.state.write().map_err(|_| Self::poisoned())?;
        state.insert(drink)
    }

    async fn update(&self, id: DrinkId, patch: &DrinkPatch) -> Result<Drink, StoreError> {
        let mut state = self.state.write().map_err(|_| Self::poisoned())?;
        if !state.drinks.contains_key(&id) {
            return Err(StoreError::NotFound);
        }

        if let Some(title) = patch.title() {
            if state.title_taken(title, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "a drink titled '{title}' already exists"
                )));
            }
        }

        let drink = state.drinks.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply(drink);
        Ok(drink.clone())
    }

    async fn delete(&self, id: DrinkId) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| Self::poisoned())?;
        state.drinks.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let mut fresh = State::default();
        for drink in seed_drinks()? {
            fresh.insert(drink)?;
        }

        let mut state = self.state.write().map_err(|_| Self::poisoned())?;
        *state = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffeeshop_core::{Ingredient, Recipe};

    fn new_drink(title: &str) -> NewDrink {
        NewDrink::new(
            title,
            Recipe::new(vec![Ingredient {
                name: "espresso".to_string(),
                color: "brown".to_string(),
                parts: 1,
            }]),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = InMemoryDrinkStore::new();
        let a = store.insert(new_drink("Ristretto")).await.unwrap();
        let b = store.insert(new_drink("Lungo")).await.unwrap();

        assert_eq!(a.id, DrinkId::new(1));
        assert_eq!(b.id, DrinkId::new(2));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryDrinkStore::new();
        let a = store.insert(new_drink("Ristretto")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.insert(new_drink("Lungo")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(store.get(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let store = InMemoryDrinkStore::new();
        store.insert(new_drink("Ristretto")).await.unwrap();
        let err = store.insert(new_drink("Ristretto")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let store = InMemoryDrinkStore::new();
        let a = store.insert(new_drink("Ristretto")).await.unwrap();

        let patch = DrinkPatch::new(Some("Doppio"), None).unwrap();
        let updated = store.update(a.id, &patch).await.unwrap();

        assert_eq!(updated.title, "Doppio");
        assert_eq!(updated.recipe, a.recipe);
        assert_eq!(store.get(a.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_may_keep_own_title_but_not_steal_another() {
        let store = InMemoryDrinkStore::new();
        let a = store.insert(new_drink("Ristretto")).await.unwrap();
        store.insert(new_drink("Lungo")).await.unwrap();

        let same = DrinkPatch::new(Some("Ristretto"), None).unwrap();
        assert!(store.update(a.id, &same).await.is_ok());

        let steal = DrinkPatch::new(Some("Lungo"), None).unwrap();
        let err = store.update(a.id, &steal).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = InMemoryDrinkStore::new();
        let patch = DrinkPatch::new(Some("Doppio"), None).unwrap();

        assert!(matches!(
            store.update(DrinkId::new(99), &patch).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete(DrinkId::new(99)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn missing_id_wins_over_title_conflict() {
        let store = InMemoryDrinkStore::new();
        store.insert(new_drink("Ristretto")).await.unwrap();

        let taken = DrinkPatch::new(Some("Ristretto"), None).unwrap();
        assert!(matches!(
            store.update(DrinkId::new(99), &taken).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn reset_leaves_only_the_seed() {
        let store = InMemoryDrinkStore::new();
        store.insert(new_drink("Ristretto")).await.unwrap();
        store.reset().await.unwrap();

        let drinks = store.list().await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].title, "water");
        assert_eq!(drinks[0].id, DrinkId::new(1));
    }
}
