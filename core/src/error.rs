//! Error taxonomy for stock, recipe and inventory operations.

use crate::kinds::IngredientKind;
use std::fmt;
use thiserror::Error;

/// Errors raised by the dispenser core.
///
/// `InvalidArgument` is a construction-time failure and is returned straight
/// from the offending constructor. `NotAvailable` and `NotSufficient` name the
/// ingredient that blocked a retrieval.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispenserError {
    /// Bad construction input: negative, missing or duplicated values
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown beverage or ingredient, or one this component does not handle
    #[error("{0} is not supported")]
    NotSupported(String),

    /// The stock is at exactly zero
    #[error("{0} is not available")]
    NotAvailable(IngredientKind),

    /// The stock is positive but below the requested amount
    #[error("{0} is not sufficient")]
    NotSufficient(IngredientKind),
}

impl DispenserError {
    /// The ingredient shortage carried by this error, if it is one.
    #[must_use]
    pub const fn shortage(&self) -> Option<Shortage> {
        match *self {
            Self::NotAvailable(ingredient) => Some(Shortage {
                ingredient,
                reason: ShortageReason::NotAvailable,
            }),
            Self::NotSufficient(ingredient) => Some(Shortage {
                ingredient,
                reason: ShortageReason::NotSufficient,
            }),
            Self::InvalidArgument(_) | Self::NotSupported(_) => None,
        }
    }
}

/// Result type for dispenser core operations.
pub type Result<T> = std::result::Result<T, DispenserError>;

/// Why an ingredient could not cover a requirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShortageReason {
    /// Stock is empty
    NotAvailable,
    /// Stock is positive but too low
    NotSufficient,
}

impl fmt::Display for ShortageReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailable => f.write_str("is not available"),
            Self::NotSufficient => f.write_str("is not sufficient"),
        }
    }
}

/// The ingredient that blocked a brew, and why.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shortage {
    /// Blocking ingredient
    pub ingredient: IngredientKind,
    /// Why it blocked
    pub reason: ShortageReason,
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ingredient, self.reason)
    }
}
