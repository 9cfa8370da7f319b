//! Result of one dispense request.

use beverage_dispenser_core::{BeverageKind, Shortage};
use std::fmt;

/// What happened to a dispense request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispenseOutcome {
    /// The beverage was brewed and its ingredients debited
    Prepared,
    /// An ingredient blocked the brew; nothing was debited
    NotPrepared(Shortage),
    /// The dispenser has no brewing unit for the requested beverage
    NotSupported,
    /// No outlet freed up within the allowed wait
    OutletsBusy,
    /// The dispenser is shutting down
    OutletsClosed,
}

impl DispenseOutcome {
    /// Short label, used for metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Prepared => "prepared",
            Self::NotPrepared(_) => "not_prepared",
            Self::NotSupported => "not_supported",
            Self::OutletsBusy => "outlets_busy",
            Self::OutletsClosed => "outlets_closed",
        }
    }
}

/// Describable status returned by every dispense call.
///
/// `Display` renders the human-readable message, for example
/// `green_tea cannot be prepared because sugar_syrup is not available`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispenseStatus {
    beverage: String,
    outcome: DispenseOutcome,
}

impl DispenseStatus {
    pub(crate) fn new(beverage: impl Into<String>, outcome: DispenseOutcome) -> Self {
        Self {
            beverage: beverage.into(),
            outcome,
        }
    }

    pub(crate) fn for_kind(kind: BeverageKind, outcome: DispenseOutcome) -> Self {
        Self::new(kind.name(), outcome)
    }

    /// Name of the requested beverage.
    #[must_use]
    pub fn beverage(&self) -> &str {
        &self.beverage
    }

    /// What happened.
    #[must_use]
    pub const fn outcome(&self) -> DispenseOutcome {
        self.outcome
    }

    /// Whether the beverage was prepared.
    #[must_use]
    pub const fn is_prepared(&self) -> bool {
        matches!(self.outcome, DispenseOutcome::Prepared)
    }

    /// The blocking ingredient, when an ingredient blocked the brew.
    #[must_use]
    pub const fn shortage(&self) -> Option<Shortage> {
        match self.outcome {
            DispenseOutcome::NotPrepared(shortage) => Some(shortage),
            _ => None,
        }
    }
}

impl fmt::Display for DispenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let beverage = &self.beverage;
        match self.outcome {
            DispenseOutcome::Prepared => write!(f, "{beverage} is prepared"),
            DispenseOutcome::NotPrepared(shortage) => {
                write!(f, "{beverage} cannot be prepared because {shortage}")
            }
            DispenseOutcome::NotSupported => write!(f, "{beverage} is not supported"),
            DispenseOutcome::OutletsBusy => {
                write!(f, "{beverage} cannot be prepared because all outlets are busy")
            }
            DispenseOutcome::OutletsClosed => {
                write!(f, "{beverage} cannot be prepared because the outlets are closed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beverage_dispenser_core::{IngredientKind, ShortageReason};

    #[test]
    fn test_status_messages() {
        let status = DispenseStatus::for_kind(BeverageKind::HotWater, DispenseOutcome::Prepared);
        assert_eq!(status.to_string(), "hot_water is prepared");
        assert!(status.is_prepared());

        let shortage = Shortage {
            ingredient: IngredientKind::SugarSyrup,
            reason: ShortageReason::NotAvailable,
        };
        let status = DispenseStatus::for_kind(
            BeverageKind::GreenTea,
            DispenseOutcome::NotPrepared(shortage),
        );
        assert_eq!(
            status.to_string(),
            "green_tea cannot be prepared because sugar_syrup is not available"
        );
        assert_eq!(status.shortage(), Some(shortage));

        let status = DispenseStatus::new("latte", DispenseOutcome::NotSupported);
        assert_eq!(status.to_string(), "latte is not supported");
        assert_eq!(status.shortage(), None);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(DispenseOutcome::OutletsBusy.label(), "outlets_busy");
        assert_eq!(
            DispenseStatus::new("hot_milk", DispenseOutcome::OutletsClosed).to_string(),
            "hot_milk cannot be prepared because the outlets are closed"
        );
    }
}
