//! Inventory store: owns every ingredient stock and performs atomic
//! multi-ingredient reservations.
//!
//! ## Locking
//!
//! A reservation locks each stock it needs in ascending [`IngredientKind`]
//! order. That order is global and independent of the request, so two
//! reservations sharing ingredients always acquire them in the same sequence
//! and no wait cycle can form. All locks of a reservation are released before
//! it returns; none is ever held across an `.await`.
//!
//! ```text
//! reserve_all(green_tea)
//!   lock water → check
//!   lock green_mixture → check
//!   lock ginger_syrup → check
//!   lock sugar_syrup → check      (first failure returns here, nothing debited)
//!   debit all four
//!   unlock
//! ```

use crate::error::{DispenserError, Result};
use crate::kinds::IngredientKind;
use crate::recipe::Recipe;
use crate::stock::{HeldStock, IngredientStock};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owns one [`IngredientStock`] per ingredient kind.
#[derive(Debug, Default)]
pub struct InventoryStore {
    stocks: BTreeMap<IngredientKind, Arc<IngredientStock>>,
}

impl InventoryStore {
    /// Create a store from a set of stocks.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if two stocks share a kind.
    pub fn new<I>(stocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = IngredientStock>,
    {
        let mut by_kind = BTreeMap::new();
        for stock in stocks {
            let kind = stock.kind();
            if by_kind.insert(kind, Arc::new(stock)).is_some() {
                return Err(DispenserError::InvalidArgument(format!(
                    "duplicate stock for {kind}"
                )));
            }
        }
        Ok(Self { stocks: by_kind })
    }

    /// Create a store from `(ingredient, initial quantity)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] for a negative quantity or
    /// a repeated ingredient.
    pub fn from_levels<I>(levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (IngredientKind, i64)>,
    {
        let stocks = levels
            .into_iter()
            .map(|(kind, initial)| IngredientStock::new(kind, initial))
            .collect::<Result<Vec<_>>>()?;
        Self::new(stocks)
    }

    /// The stock for `kind`, if this store holds one.
    #[must_use]
    pub fn stock(&self, kind: IngredientKind) -> Option<&Arc<IngredientStock>> {
        self.stocks.get(&kind)
    }

    /// Whether this store stocks `kind`.
    #[must_use]
    pub fn contains(&self, kind: IngredientKind) -> bool {
        self.stocks.contains_key(&kind)
    }

    /// Atomically debit every requirement of `recipe`.
    ///
    /// Either every ingredient is debited, or none is and the first failing
    /// ingredient in check order is reported.
    ///
    /// # Errors
    ///
    /// - [`DispenserError::NotSupported`] if the recipe names an ingredient
    ///   this store does not stock
    /// - [`DispenserError::NotAvailable`] / [`DispenserError::NotSufficient`]
    ///   for the first ingredient that cannot cover its requirement
    pub fn reserve_all(&self, recipe: &Recipe) -> Result<()> {
        let mut held: SmallVec<[(HeldStock<'_>, u64); IngredientKind::COUNT]> = SmallVec::new();

        // Requirements iterate in ascending kind order, which is the lock order.
        for (kind, amount) in recipe.requirements() {
            let stock = self
                .stocks
                .get(&kind)
                .ok_or_else(|| DispenserError::NotSupported(kind.to_string()))?;

            let guard = stock.hold();
            if let Err(error) = guard.check(amount) {
                tracing::debug!(
                    ingredient = %kind,
                    level = guard.level(),
                    required = amount,
                    "Reservation rejected"
                );
                return Err(error);
            }
            held.push((guard, amount));
        }

        for (guard, amount) in &mut held {
            let left = guard.commit(*amount);
            tracing::trace!(ingredient = %guard.kind(), debited = *amount, left, "Debited stock");
        }

        tracing::debug!(ingredients = held.len(), "Reservation committed");
        Ok(())
    }

    /// Current quantity of `kind`; 0 for `None` or an ingredient not stocked here.
    #[must_use]
    pub fn level_of(&self, kind: Option<IngredientKind>) -> u64 {
        kind.and_then(|kind| self.stocks.get(&kind))
            .map_or(0, |stock| stock.quantity())
    }

    /// Add `amount` units to the stock of `kind`, returning the new level.
    ///
    /// # Errors
    ///
    /// - [`DispenserError::NotSupported`] if `kind` is not stocked here
    /// - [`DispenserError::InvalidArgument`] if `amount` is negative
    pub fn refill(&self, kind: IngredientKind, amount: i64) -> Result<u64> {
        let stock = self
            .stocks
            .get(&kind)
            .ok_or_else(|| DispenserError::NotSupported(format!("refill of {kind}")))?;

        let level = stock.refill(amount)?;
        tracing::debug!(ingredient = %kind, amount, level, "Refilled stock");
        Ok(level)
    }

    /// Every stocked ingredient with its current level, in check order.
    ///
    /// Each level is read under its own lock; the snapshot as a whole is not
    /// taken atomically.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(IngredientKind, u64)> {
        self.stocks
            .iter()
            .map(|(&kind, stock)| (kind, stock.quantity()))
            .collect()
    }
}
