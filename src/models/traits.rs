//! Forecaster trait defining the common "fit and project" capability.

use crate::core::{DailySeries, Forecast};
use crate::error::Result;

/// Common interface for all forecasting strategies.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster: Send + Sync {
    /// Fit the model to the full daily history.
    fn fit(&mut self, series: &DailySeries) -> Result<()>;

    /// Project `horizon` steps past the end of the fitted history.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// In-sample one-step predictions.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Model name.
    fn name(&self) -> &str;

    /// Minimum number of observations `fit` accepts.
    fn min_observations(&self) -> usize;

    /// Human-readable summary of the model's configuration, used to annotate
    /// fit failures.
    fn describe_params(&self) -> String;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Boxed forecaster trait object.
pub type BoxedForecaster = Box<dyn Forecaster>;
