//! # Beverage Dispenser Core
//!
//! Ingredient stocks, recipes and the inventory store behind a multi-outlet
//! beverage dispenser.
//!
//! This crate is synchronous. It knows nothing about outlets or admission;
//! that lives in `beverage-dispenser-runtime`.
//!
//! ## Core Concepts
//!
//! - **Ingredient Stock**: one shared, thread-safe quantity counter per ingredient
//! - **Recipe**: ingredient → quantity per cup, iterated in a fixed check order
//! - **Recipe Catalog**: beverage → recipe
//! - **Inventory Store**: owns every stock and debits whole recipes atomically
//! - **Brewing Unit**: validates a beverage kind and reserves its recipe
//!
//! ## Example
//!
//! ```
//! use beverage_dispenser_core::{
//!     BeverageKind, BrewingUnit, DispenserError, IngredientKind, InventoryStore, Recipe,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), DispenserError> {
//! let store = Arc::new(InventoryStore::from_levels([(IngredientKind::Water, 120)])?);
//! let recipe = Arc::new(Recipe::from_quantities([(IngredientKind::Water, 50)])?);
//! let unit = BrewingUnit::new(BeverageKind::HotWater, recipe, Arc::clone(&store))?;
//!
//! unit.brew(BeverageKind::HotWater)?;
//! unit.brew(BeverageKind::HotWater)?;
//! assert_eq!(
//!     unit.brew(BeverageKind::HotWater),
//!     Err(DispenserError::NotSufficient(IngredientKind::Water))
//! );
//! assert_eq!(store.level_of(Some(IngredientKind::Water)), 20);
//! # Ok(())
//! # }
//! ```

pub mod brewing;
pub mod error;
pub mod inventory;
pub mod kinds;
pub mod recipe;
pub mod stock;

// Re-export commonly used types
pub use brewing::BrewingUnit;
pub use error::{DispenserError, Result, Shortage, ShortageReason};
pub use inventory::InventoryStore;
pub use kinds::{BeverageKind, IngredientKind};
pub use recipe::{Recipe, RecipeCatalog};
pub use stock::IngredientStock;
