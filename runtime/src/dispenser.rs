//! Dispenser facade.
//!
//! Routes each request through the outlet gate and the right brewing unit,
//! turning every failure into a [`DispenseStatus`].
//!
//! ```text
//! Idle → AwaitingPermit → Brewing → Prepared | NotPrepared → Idle
//!             │
//!             └─ may wait indefinitely while every outlet is busy
//! ```
//!
//! Refills and level queries bypass the gate and go straight to the
//! inventory store's per-stock primitives.

use crate::config::DispenserConfig;
use crate::gate::{GateError, OutletGate, OutletPermit};
use crate::metrics;
use crate::status::{DispenseOutcome, DispenseStatus};
use beverage_dispenser_core::{
    BeverageKind, BrewingUnit, IngredientKind, InventoryStore, RecipeCatalog, Result,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Multi-outlet beverage dispenser.
///
/// Share across tasks with an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct Dispenser {
    gate: OutletGate,
    units: BTreeMap<BeverageKind, BrewingUnit>,
    store: Arc<InventoryStore>,
    acquire_timeout: Option<Duration>,
}

impl Dispenser {
    /// Build a dispenser from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`beverage_dispenser_core::DispenserError::InvalidArgument`] if the configuration is
    /// incomplete or out of range.
    pub fn new(config: &DispenserConfig) -> Result<Self> {
        config.validate()?;

        let store = InventoryStore::from_levels(config.stock.iter().map(|(&k, &q)| (k, q)))?;
        let catalog = BeverageKind::ALL
            .into_iter()
            .map(|kind| config.recipe(kind).map(|recipe| (kind, recipe)))
            .collect::<Result<RecipeCatalog>>()?;

        let mut dispenser = Self::from_parts(config.outlet_count()?, &catalog, Arc::new(store))?;
        dispenser.acquire_timeout = config.acquire_timeout();
        Ok(dispenser)
    }

    /// Build a dispenser from an outlet count, a catalog and a store.
    ///
    /// # Errors
    ///
    /// Returns [`beverage_dispenser_core::DispenserError::InvalidArgument`] if `outlets` is zero, the
    /// catalog lacks a recipe for some beverage, or the store lacks a stock
    /// for some recipe ingredient.
    pub fn from_parts(
        outlets: usize,
        catalog: &RecipeCatalog,
        store: Arc<InventoryStore>,
    ) -> Result<Self> {
        catalog.validate_complete()?;
        let gate = OutletGate::new(outlets)?;

        let units = catalog
            .iter()
            .map(|(kind, recipe)| {
                BrewingUnit::new(kind, Arc::clone(recipe), Arc::clone(&store))
                    .map(|unit| (kind, unit))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        tracing::info!(outlets, beverages = units.len(), "Dispenser ready");
        Ok(Self {
            gate,
            units,
            store,
            acquire_timeout: None,
        })
    }

    /// Brew one cup of `kind`.
    ///
    /// Waits for a free outlet (bounded by the configured acquire timeout, if
    /// any), reserves the recipe and releases the outlet. Never fails; every
    /// problem is reported in the returned status.
    #[tracing::instrument(skip(self, kind), fields(beverage = %kind))]
    pub async fn dispense(&self, kind: BeverageKind) -> DispenseStatus {
        let permit = self.admit(self.acquire_timeout).await;
        self.brew_admitted(Ok(kind), permit)
    }

    /// Brew one cup of `kind`, waiting at most `timeout` for an outlet.
    #[tracing::instrument(skip(self, kind), fields(beverage = %kind))]
    pub async fn dispense_within(&self, kind: BeverageKind, timeout: Duration) -> DispenseStatus {
        let permit = self.admit(Some(timeout)).await;
        self.brew_admitted(Ok(kind), permit)
    }

    /// Brew one cup of the beverage with canonical name `name`.
    ///
    /// The outlet is taken before the name is parsed, so an unknown name waits
    /// for and occupies an outlet like any request. It never touches inventory
    /// and is reported as not supported.
    #[tracing::instrument(skip(self))]
    pub async fn dispense_named(&self, name: &str) -> DispenseStatus {
        let permit = self.admit(self.acquire_timeout).await;
        let requested = name.parse::<BeverageKind>().map_err(|_| name);
        self.brew_admitted(requested, permit)
    }

    async fn admit(
        &self,
        timeout: Option<Duration>,
    ) -> std::result::Result<OutletPermit, GateError> {
        match timeout {
            Some(timeout) => self.gate.acquire_timeout(timeout).await,
            None => self.gate.acquire().await,
        }
    }

    fn brew_admitted(
        &self,
        requested: std::result::Result<BeverageKind, &str>,
        permit: std::result::Result<OutletPermit, GateError>,
    ) -> DispenseStatus {
        let label = match requested {
            Ok(kind) => kind.name(),
            Err(name) => name,
        };

        let permit = match permit {
            Ok(permit) => permit,
            Err(error) => {
                tracing::warn!(%error, "Dispense rejected at the outlet gate");
                let outcome = match error {
                    GateError::Timeout(_) => DispenseOutcome::OutletsBusy,
                    GateError::Closed => DispenseOutcome::OutletsClosed,
                };
                let status = DispenseStatus::new(label, outcome);
                metrics::record_dispense(&status, None);
                return status;
            }
        };
        metrics::record_outlets_in_use(self.gate.in_use());

        let started = Instant::now();
        let status = match requested.ok().and_then(|kind| self.units.get(&kind)) {
            None => DispenseStatus::new(label, DispenseOutcome::NotSupported),
            Some(unit) => self.brew(unit),
        };
        let elapsed = started.elapsed();

        drop(permit);
        metrics::record_outlets_in_use(self.gate.in_use());
        metrics::record_dispense(&status, Some(elapsed));

        if status.is_prepared() {
            tracing::debug!(%status, "Dispensed");
        } else {
            tracing::warn!(%status, "Dispense failed");
        }
        status
    }

    fn brew(&self, unit: &BrewingUnit) -> DispenseStatus {
        let kind = unit.kind();
        match unit.brew(kind) {
            Ok(()) => {
                metrics::record_levels(
                    unit.recipe()
                        .ingredients()
                        .map(|ingredient| (ingredient, self.store.level_of(Some(ingredient)))),
                );
                DispenseStatus::for_kind(kind, DispenseOutcome::Prepared)
            }
            Err(error) => match error.shortage() {
                Some(shortage) => {
                    DispenseStatus::for_kind(kind, DispenseOutcome::NotPrepared(shortage))
                }
                None => DispenseStatus::for_kind(kind, DispenseOutcome::NotSupported),
            },
        }
    }

    /// Add `amount` units of `kind` to the stock.
    ///
    /// # Errors
    ///
    /// - [`beverage_dispenser_core::DispenserError::NotSupported`] if the dispenser does not stock `kind`
    /// - [`beverage_dispenser_core::DispenserError::InvalidArgument`] if `amount` is negative
    pub fn refill_ingredient(&self, kind: IngredientKind, amount: i64) -> Result<()> {
        let level = self.store.refill(kind, amount)?;
        metrics::record_levels([(kind, level)]);
        Ok(())
    }

    /// Current level of `kind`; 0 for `None` or an ingredient not stocked.
    #[must_use]
    pub fn ingredient_level(&self, kind: Option<IngredientKind>) -> u64 {
        self.store.level_of(kind)
    }

    /// Ingredients below one cup's requirement of some beverage, in check order.
    ///
    /// Empty when nothing is low. May be momentarily stale while brews run.
    #[must_use]
    pub fn ingredients_running_low(&self) -> Vec<IngredientKind> {
        self.units
            .values()
            .flat_map(BrewingUnit::ingredients_running_low)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every stocked ingredient with its level, in check order.
    #[must_use]
    pub fn inventory(&self) -> Vec<(IngredientKind, u64)> {
        self.store.snapshot()
    }

    /// The outlet gate.
    #[must_use]
    pub const fn gate(&self) -> &OutletGate {
        &self.gate
    }

    /// Total number of outlets.
    #[must_use]
    pub const fn outlets(&self) -> usize {
        self.gate.capacity()
    }

    /// Number of free outlets.
    #[must_use]
    pub fn available_outlets(&self) -> usize {
        self.gate.available_permits()
    }

    /// Stop admitting brews.
    ///
    /// Requests waiting for an outlet, and every later request, report
    /// [`DispenseOutcome::OutletsClosed`]. Brews already holding an outlet
    /// finish normally.
    pub fn shutdown(&self) {
        tracing::info!(in_use = self.gate.in_use(), "Dispenser shutting down");
        self.gate.close();
    }
}
