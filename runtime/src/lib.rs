//! # Beverage Dispenser Runtime
//!
//! Outlet admission and dispensing on top of `beverage-dispenser-core`.
//!
//! ## Core Components
//!
//! - **Outlet Gate**: fair, bounded permit pool limiting concurrent brews
//! - **Dispenser**: routes requests through the gate and the brewing units,
//!   turning every failure into a [`DispenseStatus`]
//! - **Config**: validated TOML / JSON configuration
//! - **Metrics**: Prometheus metrics through the `metrics` facade
//!
//! ## Example
//!
//! ```
//! use beverage_dispenser_core::{BeverageKind, IngredientKind};
//! use beverage_dispenser_runtime::{Dispenser, DispenserConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DispenserConfig::load("dispenser.toml")?;
//! let dispenser = Dispenser::new(&config)?;
//!
//! let status = dispenser.dispense(BeverageKind::GreenTea).await;
//! println!("{status}");
//!
//! dispenser.refill_ingredient(IngredientKind::SugarSyrup, 100)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispenser;
pub mod gate;
pub mod metrics;
pub mod status;

// Re-export commonly used types
pub use config::{ConfigError, DispenserConfig};
pub use dispenser::Dispenser;
pub use gate::{GateError, OutletGate, OutletPermit};
pub use status::{DispenseOutcome, DispenseStatus};
