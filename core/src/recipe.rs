//! Recipes and the recipe catalog.

use crate::error::{DispenserError, Result};
use crate::kinds::{BeverageKind, IngredientKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Quantity of each ingredient needed for one cup of a beverage.
///
/// An ingredient that is absent requires 0 units. Requirements are always
/// iterated in the fixed ingredient check order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recipe {
    requirements: BTreeMap<IngredientKind, u64>,
}

impl Recipe {
    /// Build a recipe from `(ingredient, quantity)` pairs.
    ///
    /// Zero quantities are dropped. A repeated ingredient keeps the last
    /// quantity given for it.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if any quantity is negative.
    pub fn from_quantities<I>(quantities: I) -> Result<Self>
    where
        I: IntoIterator<Item = (IngredientKind, i64)>,
    {
        let mut requirements = BTreeMap::new();
        for (kind, quantity) in quantities {
            let quantity = u64::try_from(quantity).map_err(|_| {
                DispenserError::InvalidArgument(format!(
                    "recipe quantity of {kind} cannot be negative, got {quantity}"
                ))
            })?;
            if quantity == 0 {
                requirements.remove(&kind);
            } else {
                requirements.insert(kind, quantity);
            }
        }
        Ok(Self { requirements })
    }

    /// Units of `kind` needed per cup.
    #[must_use]
    pub fn quantity(&self, kind: IngredientKind) -> u64 {
        self.requirements.get(&kind).copied().unwrap_or(0)
    }

    /// `(ingredient, quantity)` pairs in check order.
    pub fn requirements(&self) -> impl Iterator<Item = (IngredientKind, u64)> + '_ {
        self.requirements.iter().map(|(&kind, &quantity)| (kind, quantity))
    }

    /// Ingredients this recipe uses, in check order.
    pub fn ingredients(&self) -> impl Iterator<Item = IngredientKind> + '_ {
        self.requirements.keys().copied()
    }

    /// Number of ingredients this recipe uses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether this recipe needs nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// Immutable mapping from beverage to recipe.
#[derive(Clone, Debug, Default)]
pub struct RecipeCatalog {
    recipes: BTreeMap<BeverageKind, Arc<Recipe>>,
}

impl RecipeCatalog {
    /// The recipe for `kind`, if the catalog has one.
    #[must_use]
    pub fn get(&self, kind: BeverageKind) -> Option<&Arc<Recipe>> {
        self.recipes.get(&kind)
    }

    /// `(beverage, recipe)` pairs ordered by beverage.
    pub fn iter(&self) -> impl Iterator<Item = (BeverageKind, &Arc<Recipe>)> {
        self.recipes.iter().map(|(&kind, recipe)| (kind, recipe))
    }

    /// Every ingredient referenced by at least one recipe.
    #[must_use]
    pub fn ingredients(&self) -> BTreeSet<IngredientKind> {
        self.recipes
            .values()
            .flat_map(|recipe| recipe.ingredients())
            .collect()
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Check that every [`BeverageKind`] has a recipe.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] naming every beverage
    /// without a recipe.
    pub fn validate_complete(&self) -> Result<()> {
        let missing: Vec<&str> = BeverageKind::ALL
            .into_iter()
            .filter(|kind| !self.recipes.contains_key(kind))
            .map(BeverageKind::name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DispenserError::InvalidArgument(format!(
                "missing recipe for: {}",
                missing.join(", ")
            )))
        }
    }
}

impl FromIterator<(BeverageKind, Recipe)> for RecipeCatalog {
    fn from_iter<I: IntoIterator<Item = (BeverageKind, Recipe)>>(iter: I) -> Self {
        Self {
            recipes: iter
                .into_iter()
                .map(|(kind, recipe)| (kind, Arc::new(recipe)))
                .collect(),
        }
    }
}
