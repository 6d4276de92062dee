//! Request/response DTOs.

use serde::{Deserialize, Serialize};

use coffeeshop_core::{DomainResult, DrinkId, DrinkPatch, NewDrink, Recipe, RecipeInput};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

impl CreateDrinkRequest {
    pub fn into_new_drink(self) -> DomainResult<NewDrink> {
        NewDrink::new(&self.title, Recipe::from(self.recipe))
    }
}

/// Fields left out (or `null`) are not changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    pub fn into_patch(self) -> DomainResult<DrinkPatch> {
        DrinkPatch::new(self.title.as_deref(), self.recipe.map(Recipe::from))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn ok(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: DrinkId,
}
