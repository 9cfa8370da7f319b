//! Recipe-driven brewing unit.

use crate::error::{DispenserError, Result};
use crate::inventory::InventoryStore;
use crate::kinds::{BeverageKind, IngredientKind};
use crate::recipe::Recipe;
use std::sync::Arc;

/// Brews one beverage kind by reserving its recipe from the shared store.
///
/// Units do no locking of their own. Every unit that uses an ingredient
/// shares that ingredient's stock through the same [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct BrewingUnit {
    kind: BeverageKind,
    recipe: Arc<Recipe>,
    store: Arc<InventoryStore>,
}

impl BrewingUnit {
    /// Create the unit for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if the store lacks a stock
    /// for any ingredient of `recipe`.
    pub fn new(kind: BeverageKind, recipe: Arc<Recipe>, store: Arc<InventoryStore>) -> Result<Self> {
        let missing: Vec<&str> = recipe
            .ingredients()
            .filter(|&ingredient| !store.contains(ingredient))
            .map(IngredientKind::name)
            .collect();

        if !missing.is_empty() {
            return Err(DispenserError::InvalidArgument(format!(
                "{kind} uses ingredients with no stock: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            kind,
            recipe,
            store,
        })
    }

    /// The beverage this unit brews.
    #[must_use]
    pub const fn kind(&self) -> BeverageKind {
        self.kind
    }

    /// This unit's recipe.
    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Brew one cup of `requested`.
    ///
    /// # Errors
    ///
    /// - [`DispenserError::NotSupported`] if `requested` is not this unit's kind
    /// - [`DispenserError::NotAvailable`] / [`DispenserError::NotSufficient`]
    ///   for the first blocking ingredient; nothing is debited in that case
    pub fn brew(&self, requested: BeverageKind) -> Result<()> {
        if requested != self.kind {
            return Err(DispenserError::NotSupported(format!(
                "{requested} in the {} unit",
                self.kind
            )));
        }
        self.store.reserve_all(&self.recipe)
    }

    /// Ingredients of this recipe whose level is below one cup's requirement,
    /// in check order.
    ///
    /// Levels are read one at a time while other brews may be running, so the
    /// answer can be momentarily stale.
    #[must_use]
    pub fn ingredients_running_low(&self) -> Vec<IngredientKind> {
        self.recipe
            .requirements()
            .filter(|&(ingredient, required)| self.store.level_of(Some(ingredient)) < required)
            .map(|(ingredient, _)| ingredient)
            .collect()
    }
}
