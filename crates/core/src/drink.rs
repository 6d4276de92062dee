//! Drink entity, its write models and its read projections.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::DrinkId;
use crate::recipe::{Recipe, ShortIngredient};

/// Longest title the `drink` table accepts.
pub const MAX_TITLE_LEN: usize = 80;

/// A drink as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Recipe,
}

/// Public menu projection: ingredient names are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortDrink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// Full projection including ingredient names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongDrink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Recipe,
}

impl Drink {
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.short(),
        }
    }

    pub fn long(&self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title cannot be longer than {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

/// A validated drink that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    title: String,
    recipe: Recipe,
}

impl NewDrink {
    pub fn new(title: &str, recipe: Recipe) -> DomainResult<Self> {
        let title = validate_title(title)?;
        recipe.validate()?;
        Ok(Self { title, recipe })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn into_drink(self, id: DrinkId) -> Drink {
        Drink {
            id,
            title: self.title,
            recipe: self.recipe,
        }
    }
}

/// Partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkPatch {
    title: Option<String>,
    recipe: Option<Recipe>,
}

impl DrinkPatch {
    pub fn new(title: Option<&str>, recipe: Option<Recipe>) -> DomainResult<Self> {
        let title = title.map(validate_title).transpose()?;
        if let Some(recipe) = &recipe {
            recipe.validate()?;
        }
        Ok(Self { title, recipe })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    pub fn apply(&self, drink: &mut Drink) {
        if let Some(title) = &self.title {
            drink.title = title.clone();
        }
        if let Some(recipe) = &self.recipe {
            drink.recipe = recipe.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    fn recipe(name: &str) -> Recipe {
        Recipe::new(vec![Ingredient {
            name: name.to_string(),
            color: "brown".to_string(),
            parts: 2,
        }])
    }

    fn drink() -> Drink {
        NewDrink::new("Espresso", recipe("coffee"))
            .unwrap()
            .into_drink(DrinkId::new(7))
    }

    #[test]
    fn new_drink_trims_title() {
        let new = NewDrink::new("  Mocha ", recipe("chocolate")).unwrap();
        assert_eq!(new.title(), "Mocha");
    }

    #[test]
    fn new_drink_rejects_empty_title() {
        let err = NewDrink::new("   ", recipe("coffee")).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty title"),
        }
    }

    #[test]
    fn new_drink_rejects_overlong_title() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(NewDrink::new(&title, recipe("coffee")).is_err());
    }

    #[test]
    fn patch_with_title_only_keeps_recipe() {
        let mut d = drink();
        let before = d.recipe.clone();

        DrinkPatch::new(Some("Doppio"), None).unwrap().apply(&mut d);

        assert_eq!(d.title, "Doppio");
        assert_eq!(d.recipe, before);
        assert_eq!(d.id, DrinkId::new(7));
    }

    #[test]
    fn patch_with_recipe_only_keeps_title() {
        let mut d = drink();
        DrinkPatch::new(None, Some(recipe("milk"))).unwrap().apply(&mut d);

        assert_eq!(d.title, "Espresso");
        assert_eq!(d.recipe.ingredients()[0].name, "milk");
    }

    #[test]
    fn patch_validates_supplied_fields() {
        assert!(DrinkPatch::new(Some(""), None).is_err());
        assert!(DrinkPatch::new(None, Some(Recipe::new(vec![]))).is_err());
        assert!(DrinkPatch::new(None, None).unwrap().is_empty());
    }

    #[test]
    fn views_differ_only_in_ingredient_names() {
        let d = drink();
        let short = serde_json::to_value(d.short()).unwrap();
        let long = serde_json::to_value(d.long()).unwrap();

        assert_eq!(
            short,
            serde_json::json!({"id": 7, "title": "Espresso", "recipe": [{"color": "brown", "parts": 2}]})
        );
        assert_eq!(
            long,
            serde_json::json!({"id": 7, "title": "Espresso", "recipe": [{"name": "coffee", "color": "brown", "parts": 2}]})
        );
    }
}
