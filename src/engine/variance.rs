//! Demand variability from history, with fallbacks for short series.

use crate::config::DEFAULT_ROLLING_WINDOW_DAYS;
use crate::core::DailySeries;
use crate::error::{PlannerError, Result};
use crate::utils::std_dev;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a variance estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceMethod {
    /// Sample standard deviation over the trailing window.
    Rolling,
    /// Whole-series sample standard deviation; history shorter than the window.
    Overall,
    /// Fewer than two observations.
    InsufficientData,
}

impl VarianceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rolling => "rolling",
            Self::Overall => "overall",
            Self::InsufficientData => "insufficient-data",
        }
    }
}

impl fmt::Display for VarianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard deviation of daily demand, tagged with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceEstimate {
    pub std_dev: f64,
    pub method: VarianceMethod,
}

impl VarianceEstimate {
    fn new(std_dev: f64, method: VarianceMethod) -> Self {
        let std_dev = if std_dev.is_nan() { 0.0 } else { std_dev };
        Self { std_dev, method }
    }
}

/// Estimates demand variability over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarianceEstimator {
    window_days: usize,
}

impl Default for VarianceEstimator {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_ROLLING_WINDOW_DAYS,
        }
    }
}

impl VarianceEstimator {
    pub fn new(window_days: usize) -> Result<Self> {
        if window_days == 0 {
            return Err(PlannerError::InvalidParameter(
                "variance window must be at least one day".to_string(),
            ));
        }
        Ok(Self { window_days })
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    pub fn estimate(&self, series: &DailySeries) -> VarianceEstimate {
        self.estimate_values(series.values())
    }

    /// Estimate from raw daily values in chronological order.
    pub fn estimate_values(&self, values: &[f64]) -> VarianceEstimate {
        if values.len() >= self.window_days {
            let window = &values[values.len() - self.window_days..];
            return VarianceEstimate::new(std_dev(window), VarianceMethod::Rolling);
        }

        if values.len() >= 2 {
            tracing::warn!(
                observations = values.len(),
                window_days = self.window_days,
                "history shorter than rolling window, using overall standard deviation"
            );
            return VarianceEstimate::new(std_dev(values), VarianceMethod::Overall);
        }

        tracing::warn!(
            observations = values.len(),
            "not enough history to estimate demand variability, assuming zero"
        );
        VarianceEstimate::new(0.0, VarianceMethod::InsufficientData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uses_trailing_window_when_long_enough() {
        let estimator = VarianceEstimator::new(4).unwrap();
        // Only the last four values matter.
        let estimate = estimator.estimate_values(&[100.0, -50.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(estimate.method, VarianceMethod::Rolling);
        assert_relative_eq!(estimate.std_dev, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn window_of_exact_length_is_rolling() {
        let estimator = VarianceEstimator::new(3).unwrap();
        let estimate = estimator.estimate_values(&[2.0, 4.0, 6.0]);
        assert_eq!(estimate.method, VarianceMethod::Rolling);
        assert_relative_eq!(estimate.std_dev, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn falls_back_to_overall_for_short_history() {
        let estimate = VarianceEstimator::default().estimate_values(&[1.0, 3.0]);
        assert_eq!(estimate.method, VarianceMethod::Overall);
        assert_relative_eq!(estimate.std_dev, 2.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn single_observation_is_zero() {
        for values in [&[][..], &[7.0][..]] {
            let estimate = VarianceEstimator::default().estimate_values(values);
            assert_eq!(estimate.method, VarianceMethod::InsufficientData);
            assert_eq!(estimate.std_dev, 0.0);
        }
    }

    #[test]
    fn constant_history_has_zero_spread() {
        let estimate = VarianceEstimator::default().estimate_values(&[10.0; 120]);
        assert_eq!(estimate.method, VarianceMethod::Rolling);
        assert_eq!(estimate.std_dev, 0.0);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            VarianceEstimator::new(0),
            Err(PlannerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn method_tags_serialize_in_kebab_case() {
        assert_eq!(
            serde_json::to_string(&VarianceMethod::InsufficientData).unwrap(),
            "\"insufficient-data\""
        );
        assert_eq!(VarianceMethod::Rolling.to_string(), "rolling");
    }
}
