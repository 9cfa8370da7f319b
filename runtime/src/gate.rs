//! Outlet admission gate.
//!
//! A fixed pool of outlet permits. At most `capacity` brews hold a permit at
//! any instant; further callers wait in first-come-first-served order.
//!
//! ## Usage
//!
//! ```
//! use beverage_dispenser_runtime::gate::OutletGate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = OutletGate::new(3)?;
//!
//! let permit = gate.acquire().await?;
//! assert_eq!(gate.in_use(), 1);
//!
//! // Permit is released when dropped
//! drop(permit);
//! assert_eq!(gate.available_permits(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! Dropping an `acquire` future while it waits removes the caller from the
//! queue without taking or leaking a permit. A granted [`OutletPermit`] gives
//! its permit back on drop, on every path including unwinding.

use beverage_dispenser_core::{DispenserError, Result};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Why an outlet could not be granted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No outlet freed up within the allowed wait
    #[error("no outlet became free within {0:?}")]
    Timeout(Duration),

    /// The gate was closed while or before waiting
    #[error("outlet gate is closed")]
    Closed,
}

/// Bounded, fair pool of outlet permits.
#[derive(Debug)]
pub struct OutletGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl OutletGate {
    /// Create a gate with `capacity` outlets.
    ///
    /// # Errors
    ///
    /// Returns [`DispenserError::InvalidArgument`] if `capacity` is zero or
    /// exceeds the semaphore's limit.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DispenserError::InvalidArgument(
                "number of outlets must be at least 1".to_string(),
            ));
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(DispenserError::InvalidArgument(format!(
                "number of outlets cannot exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// Wait for a free outlet.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Closed`] if the gate is closed.
    pub async fn acquire(&self) -> std::result::Result<OutletPermit, GateError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GateError::Closed)?;

        tracing::trace!(in_use = self.in_use(), "Acquired outlet permit");
        Ok(OutletPermit { _permit: permit })
    }

    /// Wait at most `timeout` for a free outlet.
    ///
    /// # Errors
    ///
    /// - [`GateError::Timeout`] if no outlet freed up in time
    /// - [`GateError::Closed`] if the gate is closed
    pub async fn acquire_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<OutletPermit, GateError> {
        tokio::time::timeout(timeout, self.acquire())
            .await
            .map_err(|_| {
                tracing::warn!(?timeout, "Outlet acquire timed out");
                GateError::Timeout(timeout)
            })?
    }

    /// Close the gate.
    ///
    /// Waiting and future acquires fail with [`GateError::Closed`]. Permits
    /// already granted stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Whether [`OutletGate::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Number of free outlets.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of outlets currently granted.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available_permits())
    }

    /// Total number of outlets.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One granted outlet; released on drop.
#[derive(Debug)]
#[must_use = "the outlet is released as soon as the permit is dropped"]
pub struct OutletPermit {
    _permit: OwnedSemaphorePermit,
}
