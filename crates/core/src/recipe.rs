//! Recipe value objects.
//!
//! A recipe is an ordered list of ingredients. It is persisted as JSON text
//! and must parse back into this shape before it is treated as valid.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// One ingredient of a drink: what it is, how it is drawn, how much of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// Ingredient projection without the name (public menu view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

impl From<&Ingredient> for ShortIngredient {
    fn from(value: &Ingredient) -> Self {
        Self {
            color: value.color.clone(),
            parts: value.parts,
        }
    }
}

/// Ordered list of ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

/// Recipe as accepted from clients: either a list or a lone ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Recipe {
    fn from(value: RecipeInput) -> Self {
        match value {
            RecipeInput::Many(items) => Recipe(items),
            RecipeInput::One(item) => Recipe(vec![item]),
        }
    }
}

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    /// Check the recipe is usable: at least one ingredient, each one named,
    /// coloured and contributing at least one part.
    pub fn validate(&self) -> DomainResult<()> {
        if self.0.is_empty() {
            return Err(DomainError::validation("recipe must contain at least one ingredient"));
        }

        for (idx, ingredient) in self.0.iter().enumerate() {
            if ingredient.name.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "ingredient {idx}: name cannot be empty"
                )));
            }
            if ingredient.color.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "ingredient {idx}: color cannot be empty"
                )));
            }
            if ingredient.parts == 0 {
                return Err(DomainError::validation(format!(
                    "ingredient {idx}: parts must be at least 1"
                )));
            }
        }

        Ok(())
    }

    pub fn short(&self) -> Vec<ShortIngredient> {
        self.0.iter().map(ShortIngredient::from).collect()
    }

    /// Serialize to the text form stored in the `recipe` column.
    pub fn to_text(&self) -> DomainResult<String> {
        serde_json::to_string(&self.0)
            .map_err(|e| DomainError::validation(format!("recipe not serializable: {e}")))
    }

    /// Parse the stored text form back into a recipe.
    pub fn from_text(text: &str) -> DomainResult<Self> {
        let input: RecipeInput = serde_json::from_str(text)
            .map_err(|e| DomainError::validation(format!("recipe is not well-formed: {e}")))?;
        Ok(input.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Ingredient {
        Ingredient {
            name: "Water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }
    }

    #[test]
    fn accepts_list_or_single_ingredient() {
        let many: RecipeInput =
            serde_json::from_str(r#"[{"name":"Water","color":"blue","parts":1}]"#).unwrap();
        let one: RecipeInput =
            serde_json::from_str(r#"{"name":"Water","color":"blue","parts":1}"#).unwrap();

        assert_eq!(Recipe::from(many), Recipe::new(vec![water()]));
        assert_eq!(Recipe::from(one), Recipe::new(vec![water()]));
    }

    #[test]
    fn text_form_round_trips() {
        let recipe = Recipe::new(vec![water()]);
        let text = recipe.to_text().unwrap();
        assert_eq!(text, r#"[{"name":"Water","color":"blue","parts":1}]"#);
        assert_eq!(Recipe::from_text(&text).unwrap(), recipe);
    }

    #[test]
    fn malformed_text_is_rejected() {
        let err = Recipe::from_text("not json").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Recipe::from_text(r#"[{"color":"blue"}]"#).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn validate_rejects_empty_recipe() {
        let err = Recipe::new(vec![]).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn validate_rejects_zero_parts_and_blank_fields() {
        let mut zero = water();
        zero.parts = 0;
        assert!(Recipe::new(vec![zero]).validate().is_err());

        let mut unnamed = water();
        unnamed.name = "  ".to_string();
        assert!(Recipe::new(vec![unnamed]).validate().is_err());

        let mut colourless = water();
        colourless.color = String::new();
        assert!(Recipe::new(vec![colourless]).validate().is_err());
    }

    #[test]
    fn short_projection_drops_names() {
        let recipe = Recipe::new(vec![water()]);
        let short = serde_json::to_value(recipe.short()).unwrap();
        assert_eq!(short, serde_json::json!([{"color": "blue", "parts": 1}]));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the short projection never leaks ingredient names.
            #[test]
            fn short_view_never_contains_name_key(
                items in proptest::collection::vec(
                    ("[a-z]{1,12}", "[a-z]{1,8}", 1u32..10),
                    0..6,
                )
            ) {
                let recipe = Recipe::new(
                    items
                        .into_iter()
                        .map(|(name, color, parts)| Ingredient { name, color, parts })
                        .collect(),
                );
                let json = serde_json::to_value(recipe.short()).unwrap();
                for entry in json.as_array().unwrap() {
                    prop_assert!(entry.get("name").is_none());
                }
                prop_assert_eq!(json.as_array().unwrap().len(), recipe.ingredients().len());
            }
        }
    }
}
