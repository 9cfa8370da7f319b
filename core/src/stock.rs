//! Shared, thread-safe quantity counter for one ingredient.
//!
//! Every read and write of a stock's quantity happens under that stock's own
//! mutex. `retrieve` runs the availability test and the decrement inside one
//! critical section, so two retrievals can never both observe sufficiency and
//! drive the quantity negative.

use crate::error::{DispenserError, Result};
use crate::kinds::IngredientKind;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The mutable quantity record for one ingredient kind.
#[derive(Debug)]
pub struct IngredientStock {
    kind: IngredientKind,
    quantity: Mutex<u64>,
}

impl IngredientStock {
    /// Create a stock holding `initial` units.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if `initial` is negative.
    pub fn new(kind: IngredientKind, initial: i64) -> Result<Self> {
        let quantity = u64::try_from(initial).map_err(|_| {
            DispenserError::InvalidArgument(format!(
                "initial quantity of {kind} cannot be negative, got {initial}"
            ))
        })?;
        Ok(Self {
            kind,
            quantity: Mutex::new(quantity),
        })
    }

    /// The ingredient held by this stock.
    #[must_use]
    pub const fn kind(&self) -> IngredientKind {
        self.kind
    }

    /// Current quantity.
    #[must_use]
    pub fn quantity(&self) -> u64 {
        *self.lock()
    }

    /// Test whether `amount` could be retrieved right now, without retrieving it.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::NotAvailable`] if the stock is empty, or
    /// [`DispenserError::NotSufficient`] if it is positive but below `amount`.
    pub fn check(&self, amount: u64) -> Result<()> {
        self.hold().check(amount)
    }

    /// Retrieve `amount` units, returning the quantity left.
    ///
    /// On failure the quantity is unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`IngredientStock::check`].
    pub fn retrieve(&self, amount: u64) -> Result<u64> {
        let mut held = self.hold();
        held.check(amount)?;
        Ok(held.commit(amount))
    }

    /// Add `amount` units, returning the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if `amount` is negative or
    /// the new quantity would overflow the counter.
    pub fn refill(&self, amount: i64) -> Result<u64> {
        let amount = u64::try_from(amount).map_err(|_| {
            DispenserError::InvalidArgument(format!(
                "refill amount for {} cannot be negative, got {amount}",
                self.kind
            ))
        })?;

        let mut quantity = self.lock();
        *quantity = quantity.checked_add(amount).ok_or_else(|| {
            DispenserError::InvalidArgument(format!(
                "refilling {} by {amount} overflows the stock counter",
                self.kind
            ))
        })?;
        Ok(*quantity)
    }

    /// Take this stock's lock and keep it until the returned guard is dropped.
    pub(crate) fn hold(&self) -> HeldStock<'_> {
        HeldStock {
            kind: self.kind,
            quantity: self.lock(),
        }
    }

    // The quantity is a single integer written in one statement, so a panic
    // elsewhere while the lock was held cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.quantity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A stock whose lock is held by the current thread.
///
/// Used by the inventory store to check a whole batch of stocks before
/// debiting any of them.
#[derive(Debug)]
pub(crate) struct HeldStock<'a> {
    kind: IngredientKind,
    quantity: MutexGuard<'a, u64>,
}

impl HeldStock<'_> {
    pub(crate) const fn kind(&self) -> IngredientKind {
        self.kind
    }

    pub(crate) fn level(&self) -> u64 {
        *self.quantity
    }

    pub(crate) fn check(&self, amount: u64) -> Result<()> {
        let level = *self.quantity;
        if level >= amount {
            Ok(())
        } else if level == 0 {
            Err(DispenserError::NotAvailable(self.kind))
        } else {
            Err(DispenserError::NotSufficient(self.kind))
        }
    }

    /// Subtract an amount that [`HeldStock::check`] accepted under this same guard.
    pub(crate) fn commit(&mut self, amount: u64) -> u64 {
        *self.quantity -= amount;
        *self.quantity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_negative_initial_quantity_is_rejected() {
        let result = IngredientStock::new(IngredientKind::Water, -1);
        assert!(matches!(result, Err(DispenserError::InvalidArgument(_))));
    }

    #[test]
    fn test_check_reports_not_available_and_not_sufficient() {
        let stock = IngredientStock::new(IngredientKind::Milk, 0).unwrap();
        assert_eq!(
            stock.check(10),
            Err(DispenserError::NotAvailable(IngredientKind::Milk))
        );

        stock.refill(5).unwrap();
        assert_eq!(
            stock.check(10),
            Err(DispenserError::NotSufficient(IngredientKind::Milk))
        );
        assert_eq!(stock.check(5), Ok(()));
        assert_eq!(stock.quantity(), 5);
    }

    #[test]
    fn test_zero_requirement_on_empty_stock_succeeds() {
        let stock = IngredientStock::new(IngredientKind::Milk, 0).unwrap();
        assert_eq!(stock.check(0), Ok(()));
        assert_eq!(stock.retrieve(0), Ok(0));
    }

    #[test]
    fn test_failed_retrieve_leaves_quantity_unchanged() {
        let stock = IngredientStock::new(IngredientKind::SugarSyrup, 30).unwrap();
        assert_eq!(
            stock.retrieve(50),
            Err(DispenserError::NotSufficient(IngredientKind::SugarSyrup))
        );
        assert_eq!(stock.quantity(), 30);
        assert_eq!(stock.retrieve(30), Ok(0));
        assert_eq!(
            stock.retrieve(1),
            Err(DispenserError::NotAvailable(IngredientKind::SugarSyrup))
        );
    }

    #[test]
    fn test_refill_rejects_negative_and_overflow() {
        let stock = IngredientStock::new(IngredientKind::Water, 10).unwrap();
        assert!(matches!(
            stock.refill(-5),
            Err(DispenserError::InvalidArgument(_))
        ));
        assert_eq!(stock.quantity(), 10);

        let full = IngredientStock::new(IngredientKind::Water, i64::MAX).unwrap();
        full.refill(i64::MAX).unwrap();
        assert!(matches!(full.refill(2), Err(DispenserError::InvalidArgument(_))));
    }

    #[test]
    #[allow(clippy::panic)]
    fn test_poisoned_lock_is_recovered() {
        let stock = IngredientStock::new(IngredientKind::Milk, 100).unwrap();

        let result = thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _held = stock.hold();
                    panic!("brew aborted while holding milk");
                })
                .join()
        });
        assert!(result.is_err());
        assert!(stock.quantity.is_poisoned());

        assert_eq!(stock.quantity(), 100);
        assert_eq!(stock.retrieve(40), Ok(60));
        assert_eq!(stock.refill(15), Ok(75));
        assert_eq!(
            stock.check(80),
            Err(DispenserError::NotSufficient(IngredientKind::Milk))
        );
    }

    #[test]
    fn test_concurrent_retrievals_never_oversell() {
        let stock = Arc::new(IngredientStock::new(IngredientKind::Water, 1_000).unwrap());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let stock = Arc::clone(&stock);
                thread::spawn(move || (0..100).filter(|_| stock.retrieve(1).is_ok()).count())
            })
            .collect();

        let succeeded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(succeeded, 1_000);
        assert_eq!(stock.quantity(), 0);
    }

    proptest! {
        #[test]
        fn prop_quantity_is_initial_plus_refills_minus_successful_retrievals(
            initial in 0i64..500,
            ops in proptest::collection::vec((any::<bool>(), 0i64..200), 0..64),
        ) {
            let stock = IngredientStock::new(IngredientKind::GingerSyrup, initial).unwrap();
            let mut expected = initial.unsigned_abs();

            for (is_refill, amount) in ops {
                let amount_u = amount.unsigned_abs();
                if is_refill {
                    stock.refill(amount).unwrap();
                    expected += amount_u;
                } else if stock.retrieve(amount_u).is_ok() {
                    prop_assert!(expected >= amount_u);
                    expected -= amount_u;
                } else {
                    prop_assert!(expected < amount_u);
                }
                prop_assert_eq!(stock.quantity(), expected);
            }
        }
    }
}
