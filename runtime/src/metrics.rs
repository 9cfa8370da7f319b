//! Prometheus metrics for the dispenser.
//!
//! Recording goes through the `metrics` facade, so every call here is a no-op
//! until a recorder is installed. [`MetricsRecorder::install`] installs the
//! Prometheus exporter and keeps a handle for rendering.
//!
//! # Example
//!
//! ```rust,no_run
//! use beverage_dispenser_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = MetricsRecorder::install()?;
//! // ... dispense ...
//! println!("{}", recorder.render());
//! # Ok(())
//! # }
//! ```

use crate::status::DispenseStatus;
use beverage_dispenser_core::IngredientKind;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Installed Prometheus recorder.
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// Describe every dispenser metric and install the Prometheus recorder
    /// as the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or a global recorder is
    /// already installed.
    pub fn install() -> Result<Self, MetricsError> {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_01, 0.000_05, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;

        register_metrics();
        tracing::info!("Dispenser metrics recorder installed");
        Ok(Self { handle })
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "dispenser_brews_total",
        "Dispense requests by beverage and outcome"
    );
    describe_histogram!(
        "dispenser_brew_duration_seconds",
        "Time spent brewing once an outlet was granted"
    );
    describe_gauge!("dispenser_outlets_in_use", "Outlets currently brewing");
    describe_gauge!(
        "dispenser_ingredient_level",
        "Current stock level by ingredient"
    );
}

/// Record the outcome of one dispense request.
pub(crate) fn record_dispense(status: &DispenseStatus, brewing: Option<Duration>) {
    counter!(
        "dispenser_brews_total",
        "beverage" => status.beverage().to_string(),
        "outcome" => status.outcome().label()
    )
    .increment(1);

    if let Some(elapsed) = brewing {
        histogram!(
            "dispenser_brew_duration_seconds",
            "beverage" => status.beverage().to_string()
        )
        .record(elapsed.as_secs_f64());
    }
}

/// Record the number of outlets currently granted.
#[allow(clippy::cast_precision_loss)] // Outlet counts are far below 2^52
pub(crate) fn record_outlets_in_use(in_use: usize) {
    gauge!("dispenser_outlets_in_use").set(in_use as f64);
}

/// Record the current level of every ingredient a brew or refill touched.
#[allow(clippy::cast_precision_loss)] // Levels far above 2^52 only lose display precision
pub(crate) fn record_levels(levels: impl IntoIterator<Item = (IngredientKind, u64)>) {
    for (ingredient, level) in levels {
        gauge!("dispenser_ingredient_level", "ingredient" => ingredient.name()).set(level as f64);
    }
}
