//! # Beverage Dispenser Testing
//!
//! Testing utilities and helpers for the beverage dispenser.
//!
//! This crate provides:
//! - The reference machine: its configuration and a ready dispenser
//! - Small single-ingredient fixtures for exact arithmetic
//! - Tracing setup for tests
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use beverage_dispenser_testing::reference_dispenser;
//!
//! #[tokio::test]
//! async fn test_green_tea() {
//!     let dispenser = reference_dispenser();
//!     let status = dispenser.dispense(BeverageKind::GreenTea).await;
//!     assert!(status.is_prepared());
//! }
//! ```

/// Configurations and dispensers for tests
pub mod fixtures {
    use beverage_dispenser_core::{BeverageKind, IngredientKind};
    use beverage_dispenser_runtime::{Dispenser, DispenserConfig};
    use std::collections::BTreeMap;

    /// The reference machine in the JSON machine layout.
    ///
    /// Three outlets; the starting levels and recipes are the ones the
    /// dispenser's behaviour is specified against.
    pub const REFERENCE_JSON: &str = r#"{
  "machine": {
    "outlets": { "count_n": 3 },
    "total_items_quantity": {
      "hot_water": 500,
      "hot_milk": 500,
      "tea_leaves_syrup": 100,
      "green_mixture": 300,
      "ginger_syrup": 300,
      "elaichi_syrup": 300,
      "coffee_syrup": 300,
      "sugar_syrup": 100
    },
    "beverages": {
      "hot_water": { "water": 50 },
      "hot_milk": { "milk": 50 },
      "hot_coffee": {
        "hot_water": 100,
        "hot_milk": 400,
        "coffe_syrup": 30,
        "sugar_syrup": 50
      },
      "green_tea": {
        "hot_water": 100,
        "green_mixture": 30,
        "ginger_syrup": 30,
        "sugar_syrup": 50
      },
      "elaichi_tea": {
        "hot_water": 200,
        "hot_milk": 100,
        "tea_leaves_syrup": 30,
        "elaichi_syrup": 30,
        "sugar_syrup": 10
      },
      "ginger_tea": {
        "hot_water": 200,
        "hot_milk": 100,
        "tea_leaves_syrup": 30,
        "ginger_syrup": 10,
        "sugar_syrup": 10
      }
    }
  }
}"#;

    /// The reference machine configuration.
    ///
    /// # Panics
    ///
    /// Panics if [`REFERENCE_JSON`] fails to parse, which would be a bug in
    /// this crate.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn reference_config() -> DispenserConfig {
        DispenserConfig::from_json_str(REFERENCE_JSON)
            .expect("reference configuration should always parse")
    }

    /// A dispenser built from [`reference_config`].
    ///
    /// # Panics
    ///
    /// Panics if the reference configuration is rejected.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn reference_dispenser() -> Dispenser {
        Dispenser::new(&reference_config()).expect("reference configuration should be valid")
    }

    /// Every beverage costs `per_cup` units of water and nothing else.
    #[must_use]
    pub fn water_only_config(outlets: i64, water: i64, per_cup: i64) -> DispenserConfig {
        DispenserConfig {
            outlets,
            acquire_timeout_ms: None,
            stock: BTreeMap::from([(IngredientKind::Water, water)]),
            recipes: BeverageKind::ALL
                .into_iter()
                .map(|kind| (kind, BTreeMap::from([(IngredientKind::Water, per_cup)])))
                .collect(),
        }
    }

    /// A dispenser built from [`water_only_config`].
    ///
    /// # Panics
    ///
    /// Panics if the arguments produce an invalid configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn water_only_dispenser(outlets: i64, water: i64, per_cup: i64) -> Dispenser {
        Dispenser::new(&water_only_config(outlets, water, per_cup))
            .expect("water-only configuration should be valid")
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    /// Install a test-friendly tracing subscriber, once per process.
    ///
    /// Honours `RUST_LOG`; defaults to `warn`. Later calls are ignored.
    pub fn init_tracing() {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use beverage_dispenser_core::{BeverageKind, IngredientKind, Recipe};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Any ingredient kind.
    pub fn ingredient_kind() -> impl Strategy<Value = IngredientKind> {
        proptest::sample::select(IngredientKind::ALL.to_vec())
    }

    /// Any beverage kind.
    pub fn beverage_kind() -> impl Strategy<Value = BeverageKind> {
        proptest::sample::select(BeverageKind::ALL.to_vec())
    }

    /// A starting level for every ingredient, each in `0..max`.
    pub fn stock_levels(max: i64) -> impl Strategy<Value = BTreeMap<IngredientKind, i64>> {
        proptest::collection::vec(0..max, IngredientKind::COUNT).prop_map(|levels| {
            IngredientKind::ALL.into_iter().zip(levels).collect()
        })
    }

    /// A non-empty recipe of up to four ingredients, each needing `1..max` units.
    pub fn recipe(max: i64) -> impl Strategy<Value = Recipe> {
        proptest::collection::btree_map(ingredient_kind(), 1..max, 1..=4).prop_filter_map(
            "recipe quantities are positive",
            |quantities| Recipe::from_quantities(quantities).ok(),
        )
    }
}

// Re-export commonly used items
pub use fixtures::{reference_config, reference_dispenser, water_only_config, water_only_dispenser};
pub use helpers::init_tracing;
