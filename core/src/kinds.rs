//! Ingredient and beverage kinds.
//!
//! Both enumerations are closed. Their canonical names are snake_case and are
//! used everywhere a kind is rendered: status messages, logs, metric labels
//! and configuration keys.

use crate::error::DispenserError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ingredient held in the dispenser's stock.
///
/// Variants are declared in the fixed check order. The derived `Ord` is that
/// order, and it is the single global order in which stocks are locked and in
/// which shortages are ranked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientKind {
    /// Water
    #[serde(alias = "hot_water")]
    Water,
    /// Milk
    #[serde(alias = "hot_milk")]
    Milk,
    /// Tea leaves syrup
    TeaLeavesSyrup,
    /// Green tea mixture
    GreenMixture,
    /// Ginger syrup
    GingerSyrup,
    /// Elaichi (cardamom) syrup
    ElaichiSyrup,
    /// Coffee syrup
    #[serde(alias = "coffe_syrup")]
    CoffeeSyrup,
    /// Sugar syrup
    SugarSyrup,
}

impl IngredientKind {
    /// Every ingredient, in check order.
    pub const ALL: [Self; 8] = [
        Self::Water,
        Self::Milk,
        Self::TeaLeavesSyrup,
        Self::GreenMixture,
        Self::GingerSyrup,
        Self::ElaichiSyrup,
        Self::CoffeeSyrup,
        Self::SugarSyrup,
    ];

    /// Number of ingredient kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Canonical name of this ingredient.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Milk => "milk",
            Self::TeaLeavesSyrup => "tea_leaves_syrup",
            Self::GreenMixture => "green_mixture",
            Self::GingerSyrup => "ginger_syrup",
            Self::ElaichiSyrup => "elaichi_syrup",
            Self::CoffeeSyrup => "coffee_syrup",
            Self::SugarSyrup => "sugar_syrup",
        }
    }
}

impl fmt::Display for IngredientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IngredientKind {
    type Err = DispenserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DispenserError::NotSupported(s.to_string()))
    }
}

/// A beverage the dispenser can brew.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeverageKind {
    /// Hot water
    HotWater,
    /// Hot milk
    HotMilk,
    /// Hot coffee
    HotCoffee,
    /// Green tea
    GreenTea,
    /// Elaichi tea
    ElaichiTea,
    /// Ginger tea
    GingerTea,
}

impl BeverageKind {
    /// Every beverage.
    pub const ALL: [Self; 6] = [
        Self::HotWater,
        Self::HotMilk,
        Self::HotCoffee,
        Self::GreenTea,
        Self::ElaichiTea,
        Self::GingerTea,
    ];

    /// Canonical name of this beverage.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HotWater => "hot_water",
            Self::HotMilk => "hot_milk",
            Self::HotCoffee => "hot_coffee",
            Self::GreenTea => "green_tea",
            Self::ElaichiTea => "elaichi_tea",
            Self::GingerTea => "ginger_tea",
        }
    }
}

impl fmt::Display for BeverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BeverageKind {
    type Err = DispenserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DispenserError::NotSupported(s.to_string()))
    }
}
