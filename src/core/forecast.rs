//! Forecast structures: raw model projections and the clipped daily result.

use crate::error::{PlannerError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Raw point projections produced by a fitted model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { point: values }
    }

    /// Number of projected steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Index of the first non-finite projection, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.point.iter().position(|v| !v.is_finite())
    }
}

/// Daily demand forecast: one non-negative whole-unit value per future day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    start: NaiveDate,
    values: Vec<u64>,
}

impl ForecastResult {
    /// Wrap already-rounded daily values starting at `start`.
    pub fn new(start: NaiveDate, values: Vec<u64>) -> Self {
        Self { start, values }
    }

    /// Clip negative projections to zero and round to whole units.
    ///
    /// Halves round to even.
    pub fn from_projection(start: NaiveDate, forecast: &Forecast) -> Result<Self> {
        if let Some(step) = forecast.first_non_finite() {
            return Err(PlannerError::Internal(format!(
                "projection at step {} is not finite",
                step + 1
            )));
        }
        let values = forecast
            .primary()
            .iter()
            .map(|v| v.max(0.0).round_ties_even() as u64)
            .collect();
        Ok(Self { start, values })
    }

    /// First forecast day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Calendar day of each forecast value.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.values.len()).map(move |i| self.start + Duration::days(i as i64))
    }

    /// Sum of the first `days` values (fewer if the horizon is shorter),
    /// saturating at `u64::MAX`.
    pub fn sum_first(&self, days: usize) -> u64 {
        self.values
            .iter()
            .take(days)
            .fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// Average daily demand, or `None` for an empty forecast.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().map(|&v| v as f64).sum::<f64>() / self.values.len() as f64)
    }

    pub fn into_values(self) -> Vec<u64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn projection_is_clipped_and_rounded() {
        let raw = Forecast::from_values(vec![-3.2, 0.4, 2.5, 3.5, 7.6]);
        let result = ForecastResult::from_projection(start(), &raw).unwrap();
        assert_eq!(result.values(), &[0, 0, 2, 4, 8]);
        assert_eq!(result.horizon(), 5);
    }

    #[test]
    fn non_finite_projection_is_rejected() {
        let raw = Forecast::from_values(vec![1.0, f64::NAN]);
        assert!(matches!(
            ForecastResult::from_projection(start(), &raw),
            Err(PlannerError::Internal(_))
        ));
    }

    #[test]
    fn dates_follow_start() {
        let result = ForecastResult::new(start(), vec![1, 2, 3]);
        let dates: Vec<_> = result.dates().collect();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], start());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn sum_first_stops_at_horizon() {
        let result = ForecastResult::new(start(), vec![10, 10, 10, 10, 10]);
        assert_eq!(result.sum_first(3), 30);
        assert_eq!(result.sum_first(7), 50);
    }

    #[test]
    fn sum_first_saturates() {
        let result = ForecastResult::new(start(), vec![u64::MAX, 5, 5]);
        assert_eq!(result.sum_first(3), u64::MAX);
        assert!(result.mean().unwrap() > 1e18);
    }

    #[test]
    fn mean_of_empty_forecast_is_none() {
        assert_eq!(ForecastResult::new(start(), vec![]).mean(), None);
        assert_eq!(ForecastResult::new(start(), vec![2, 4]).mean(), Some(3.0));
    }

    #[test]
    fn empty_forecast() {
        let forecast = Forecast::new();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
        assert_eq!(forecast.first_non_finite(), None);
    }
}
