//! Dispenser configuration.
//!
//! Supplies the outlet count, the initial stock and one recipe per beverage.
//! Two file layouts are accepted:
//!
//! - **TOML**, the native layout:
//!
//!   ```toml
//!   outlets = 3
//!   acquire_timeout_ms = 2000   # optional
//!
//!   [stock]
//!   water = 500
//!   milk = 500
//!
//!   [recipes.hot_water]
//!   water = 50
//!   ```
//!
//! - **JSON** in the machine layout:
//!
//!   ```json
//!   {"machine": {
//!     "outlets": {"count_n": 3},
//!     "total_items_quantity": {"hot_water": 500, "hot_milk": 500},
//!     "beverages": {"hot_water": {"water": 50}}
//!   }}
//!   ```
//!
//!   Ingredient keys accept the legacy aliases `hot_water`, `hot_milk` and
//!   `coffe_syrup`.
//!
//! Quantities are read as signed integers so that a negative value fails
//! validation with a message naming it instead of failing to parse. A key
//! given twice in one table, counting aliases, fails to parse.

use beverage_dispenser_core::{BeverageKind, DispenserError, IngredientKind, Recipe};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON document did not match the machine layout
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML document did not match the native layout
    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// File extension is neither `.json` nor `.toml`
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Configuration parsed but is incomplete or out of range
    #[error(transparent)]
    Invalid(#[from] DispenserError),
}

/// Everything needed to build a [`crate::Dispenser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenserConfig {
    /// Number of outlets (concurrent brews)
    pub outlets: i64,
    /// Default bound on waiting for an outlet; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_timeout_ms: Option<u64>,
    /// Initial quantity of each ingredient
    #[serde(deserialize_with = "unique_stock")]
    pub stock: BTreeMap<IngredientKind, i64>,
    /// Quantity of each ingredient per cup, by beverage
    #[serde(deserialize_with = "unique_recipes")]
    pub recipes: BTreeMap<BeverageKind, BTreeMap<IngredientKind, i64>>,
}

impl DispenserConfig {
    /// Load and validate a configuration file, choosing the layout by extension.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, does not parse, or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents)?,
            Some("toml") => Self::from_toml_str(&contents)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        tracing::info!(path = %path.display(), outlets = config.outlets, "Loaded dispenser configuration");
        Ok(config)
    }

    /// Parse and validate the native TOML layout.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse or is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate the JSON machine layout.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse or is invalid.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let file: MachineFile = serde_json::from_str(contents)?;
        let machine = file.machine;
        let config = Self {
            outlets: machine.outlets.count_n,
            acquire_timeout_ms: None,
            stock: machine.total_items_quantity,
            recipes: machine.beverages,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration.
    ///
    /// Total: rejects a non-positive outlet count, any negative quantity, any
    /// beverage without a recipe and any recipe ingredient without a stock.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] describing the first problem.
    pub fn validate(&self) -> Result<(), DispenserError> {
        self.outlet_count()?;

        if let Some((kind, quantity)) = self.stock.iter().find(|&(_, &quantity)| quantity < 0) {
            return Err(DispenserError::InvalidArgument(format!(
                "initial quantity of {kind} cannot be negative, got {quantity}"
            )));
        }

        for kind in BeverageKind::ALL {
            let recipe = self.recipe(kind)?;
            let unstocked: Vec<&str> = recipe
                .ingredients()
                .filter(|ingredient| !self.stock.contains_key(ingredient))
                .map(IngredientKind::name)
                .collect();
            if !unstocked.is_empty() {
                return Err(DispenserError::InvalidArgument(format!(
                    "{kind} uses ingredients with no stock: {}",
                    unstocked.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Outlet count as a capacity.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if `outlets` is not positive.
    pub fn outlet_count(&self) -> Result<usize, DispenserError> {
        usize::try_from(self.outlets)
            .ok()
            .filter(|&count| count > 0)
            .ok_or_else(|| {
                DispenserError::InvalidArgument(format!(
                    "number of outlets must be at least 1, got {}",
                    self.outlets
                ))
            })
    }

    /// The validated recipe for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if the recipe is missing or
    /// has a negative quantity.
    pub fn recipe(&self, kind: BeverageKind) -> Result<Recipe, DispenserError> {
        let quantities = self.recipes.get(&kind).ok_or_else(|| {
            DispenserError::InvalidArgument(format!("missing recipe for {kind}"))
        })?;
        Recipe::from_quantities(quantities.iter().map(|(&ingredient, &qty)| (ingredient, qty)))
    }

    /// Default outlet wait bound.
    #[must_use]
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Deserialize)]
struct MachineFile {
    machine: MachineSection,
}

#[derive(Deserialize)]
struct MachineSection {
    outlets: OutletSection,
    #[serde(deserialize_with = "unique_stock")]
    total_items_quantity: BTreeMap<IngredientKind, i64>,
    #[serde(deserialize_with = "unique_recipes")]
    beverages: BTreeMap<BeverageKind, BTreeMap<IngredientKind, i64>>,
}

#[derive(Deserialize)]
struct OutletSection {
    count_n: i64,
}

/// Map that fails to deserialize when a key repeats.
///
/// Aliased keys deserialize to the same kind, so `hot_water` next to `water`
/// counts as a repeat.
struct UniqueMap<K, V>(BTreeMap<K, V>);

impl<'de, K, V> Deserialize<'de> for UniqueMap<K, V>
where
    K: Deserialize<'de> + Ord + fmt::Display,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
    }
}

struct UniqueMapVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for UniqueMapVisitor<K, V>
where
    K: Deserialize<'de> + Ord + fmt::Display,
    V: Deserialize<'de>,
{
    type Value = UniqueMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table with no repeated keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<K, V>()? {
            match map.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(de::Error::custom(format!(
                        "{} is given more than once",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        Ok(UniqueMap(map))
    }
}

fn unique_stock<'de, D>(deserializer: D) -> Result<BTreeMap<IngredientKind, i64>, D::Error>
where
    D: Deserializer<'de>,
{
    UniqueMap::deserialize(deserializer).map(|UniqueMap(stock)| stock)
}

fn unique_recipes<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<BeverageKind, BTreeMap<IngredientKind, i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let UniqueMap(recipes) =
        UniqueMap::<BeverageKind, UniqueMap<IngredientKind, i64>>::deserialize(deserializer)?;
    Ok(recipes
        .into_iter()
        .map(|(kind, UniqueMap(quantities))| (kind, quantities))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    const MACHINE_JSON: &str = r#"{
      "machine": {
        "outlets": {"count_n": 3},
        "total_items_quantity": {
          "hot_water": 500, "hot_milk": 500, "ginger_syrup": 100,
          "sugar_syrup": 100, "tea_leaves_syrup": 100, "green_mixture": 100,
          "elaichi_syrup": 100, "coffee_syrup": 100
        },
        "beverages": {
          "hot_water": {"water": 50},
          "hot_milk": {"milk": 50},
          "hot_coffee": {"hot_water": 100, "hot_milk": 400, "coffe_syrup": 30, "sugar_syrup": 50},
          "green_tea": {"hot_water": 100, "green_mixture": 30, "ginger_syrup": 30, "sugar_syrup": 50},
          "elaichi_tea": {"hot_water": 200, "hot_milk": 100, "tea_leaves_syrup": 30, "elaichi_syrup": 30, "sugar_syrup": 10},
          "ginger_tea": {"hot_water": 200, "hot_milk": 100, "tea_leaves_syrup": 30, "ginger_syrup": 10, "sugar_syrup": 10}
        }
      }
    }"#;

    const NATIVE_TOML: &str = r"
outlets = 2
acquire_timeout_ms = 250

[stock]
water = 500
milk = 500
coffee_syrup = 100
sugar_syrup = 100

[recipes.hot_water]
water = 50

[recipes.hot_milk]
milk = 50

[recipes.hot_coffee]
water = 100
milk = 400
coffee_syrup = 30
sugar_syrup = 50

[recipes.green_tea]
water = 100

[recipes.elaichi_tea]
water = 200
milk = 100

[recipes.ginger_tea]
water = 200
milk = 100
";

    #[test]
    fn test_machine_json_layout_with_aliases() {
        let config = DispenserConfig::from_json_str(MACHINE_JSON).unwrap();

        assert_eq!(config.outlet_count().unwrap(), 3);
        assert_eq!(config.stock[&IngredientKind::Water], 500);
        assert_eq!(config.stock[&IngredientKind::Milk], 500);

        let coffee = config.recipe(BeverageKind::HotCoffee).unwrap();
        assert_eq!(coffee.quantity(IngredientKind::Water), 100);
        assert_eq!(coffee.quantity(IngredientKind::Milk), 400);
        assert_eq!(coffee.quantity(IngredientKind::CoffeeSyrup), 30);
        assert_eq!(config.acquire_timeout(), None);
    }

    #[test]
    fn test_native_toml_layout() {
        let config = DispenserConfig::from_toml_str(NATIVE_TOML).unwrap();

        assert_eq!(config.outlet_count().unwrap(), 2);
        assert_eq!(config.acquire_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.recipe(BeverageKind::HotMilk).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_recipe_is_invalid() {
        let mut config = DispenserConfig::from_toml_str(NATIVE_TOML).unwrap();
        config.recipes.remove(&BeverageKind::GingerTea);

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            DispenserError::InvalidArgument("missing recipe for ginger_tea".to_string())
        );
    }

    #[test]
    fn test_unstocked_ingredient_is_invalid() {
        let mut config = DispenserConfig::from_toml_str(NATIVE_TOML).unwrap();
        config.stock.remove(&IngredientKind::CoffeeSyrup);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("hot_coffee"), "{err}");
        assert!(err.contains("coffee_syrup"), "{err}");
    }

    #[test]
    fn test_negative_values_are_invalid() {
        let mut config = DispenserConfig::from_toml_str(NATIVE_TOML).unwrap();
        config.outlets = 0;
        assert!(config.validate().is_err());

        config.outlets = -2;
        assert!(config.validate().is_err());

        config.outlets = 1;
        config.stock.insert(IngredientKind::Water, -1);
        assert!(config.validate().is_err());

        config.stock.insert(IngredientKind::Water, 1);
        config
            .recipes
            .get_mut(&BeverageKind::HotWater)
            .unwrap()
            .insert(IngredientKind::Water, -50);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_fail_to_parse() {
        let unknown_beverage = NATIVE_TOML.replace("[recipes.green_tea]", "[recipes.latte]");
        assert!(matches!(
            DispenserConfig::from_toml_str(&unknown_beverage),
            Err(ConfigError::Toml(_))
        ));

        let unknown_ingredient = MACHINE_JSON.replace("\"ginger_syrup\": 100", "\"honey\": 100");
        assert!(matches!(
            DispenserConfig::from_json_str(&unknown_ingredient),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_alias_and_canonical_name_together_fail_to_parse() {
        let both_waters =
            MACHINE_JSON.replace("\"hot_water\": 500,", "\"hot_water\": 500, \"water\": 7,");
        let err = DispenserConfig::from_json_str(&both_waters).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)), "{err}");
        assert!(err.to_string().contains("water is given more than once"), "{err}");

        let both_milks = MACHINE_JSON.replace(
            "\"hot_milk\": {\"milk\": 50}",
            "\"hot_milk\": {\"milk\": 50, \"hot_milk\": 5}",
        );
        assert!(matches!(
            DispenserConfig::from_json_str(&both_milks),
            Err(ConfigError::Json(_))
        ));

        let both_coffees = NATIVE_TOML.replace(
            "coffee_syrup = 30\n",
            "coffee_syrup = 30\ncoffe_syrup = 3\n",
        );
        let err = DispenserConfig::from_toml_str(&both_coffees).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
        assert!(err.to_string().contains("coffee_syrup is given more than once"), "{err}");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let err = DispenserConfig::load("dispenser.yaml").unwrap_err();
        // The file does not exist, so reading fails before the format check
        assert!(matches!(err, ConfigError::Io { .. }));

        let dir = std::env::temp_dir().join(format!("dispenser-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let yaml = dir.join("dispenser.yaml");
        std::fs::write(&yaml, "outlets: 1").unwrap();
        assert!(matches!(
            DispenserConfig::load(&yaml),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        let toml_path = dir.join("dispenser.toml");
        std::fs::write(&toml_path, NATIVE_TOML).unwrap();
        assert_eq!(DispenserConfig::load(&toml_path).unwrap().outlets, 2);

        let json_path = dir.join("dispenser.json");
        std::fs::write(&json_path, MACHINE_JSON).unwrap();
        assert_eq!(DispenserConfig::load(&json_path).unwrap().outlets, 3);

        std::fs::remove_dir_all(&dir).ok();
    }
}
