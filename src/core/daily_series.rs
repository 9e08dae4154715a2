//! Daily demand series with optional on-hand inventory observations.

use crate::error::{PlannerError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single calendar day of a product's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// Units sold on this day.
    pub units: f64,
    /// On-hand inventory recorded on this day, if any.
    pub inventory: Option<f64>,
}

impl DailyPoint {
    pub fn new(date: NaiveDate, units: f64) -> Self {
        Self {
            date,
            units,
            inventory: None,
        }
    }

    pub fn with_inventory(mut self, inventory: f64) -> Self {
        self.inventory = Some(inventory);
        self
    }
}

/// A gap-free daily series of non-negative demand observations.
///
/// Dates are implicit: observation `i` belongs to `start + i days`, so the
/// series is strictly increasing with exactly one value per calendar day by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
    inventory: Vec<Option<f64>>,
}

impl DailySeries {
    /// Create a series of consecutive daily values beginning at `start`.
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        validate_quantities("units", values.iter().copied())?;
        let inventory = vec![None; values.len()];
        Ok(Self {
            start,
            values,
            inventory,
        })
    }

    /// Attach on-hand inventory observations, one slot per day.
    pub fn with_inventory(mut self, inventory: Vec<Option<f64>>) -> Result<Self> {
        if inventory.len() != self.values.len() {
            return Err(PlannerError::InvalidParameter(format!(
                "inventory has {} entries but series has {} days",
                inventory.len(),
                self.values.len()
            )));
        }
        validate_quantities("inventory", inventory.iter().flatten().copied())?;
        self.inventory = inventory;
        Ok(self)
    }

    /// Build a series from explicit points, which must cover consecutive days.
    pub fn from_points(points: Vec<DailyPoint>) -> Result<Self> {
        let start = points
            .first()
            .map(|p| p.date)
            .ok_or(PlannerError::InsufficientData { needed: 1, got: 0 })?;

        for pair in points.windows(2) {
            let step = (pair[1].date - pair[0].date).num_days();
            if step <= 0 {
                return Err(PlannerError::TimestampError(format!(
                    "dates must be strictly increasing ({} then {})",
                    pair[0].date, pair[1].date
                )));
            }
            if step > 1 {
                return Err(PlannerError::TimestampError(format!(
                    "missing days between {} and {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        let (values, inventory) = points.into_iter().map(|p| (p.units, p.inventory)).unzip();
        Self::new(start, values)?.with_inventory(inventory)
    }

    /// Number of days in the series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First calendar day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day, if the series has any observations.
    pub fn end(&self) -> Option<NaiveDate> {
        self.len()
            .checked_sub(1)
            .map(|last| self.start + Duration::days(last as i64))
    }

    /// The day after the last observation, where a forecast begins.
    pub fn forecast_start(&self) -> NaiveDate {
        self.start + Duration::days(self.len() as i64)
    }

    /// Demand values in chronological order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The trailing `n` values (or all of them when shorter).
    pub fn tail(&self, n: usize) -> &[f64] {
        &self.values[self.len().saturating_sub(n)..]
    }

    /// On-hand inventory observations aligned with `values`.
    pub fn inventory(&self) -> &[Option<f64>] {
        &self.inventory
    }

    /// Inventory recorded on the most recent day, if present.
    pub fn latest_inventory(&self) -> Option<f64> {
        self.inventory.last().copied().flatten()
    }

    /// Iterate over the series as explicit points.
    pub fn points(&self) -> impl Iterator<Item = DailyPoint> + '_ {
        self.values
            .iter()
            .zip(&self.inventory)
            .enumerate()
            .map(move |(i, (&units, &inventory))| DailyPoint {
                date: self.start + Duration::days(i as i64),
                units,
                inventory,
            })
    }
}

fn validate_quantities(name: &str, values: impl Iterator<Item = f64>) -> Result<()> {
    for (i, v) in values.enumerate() {
        if !v.is_finite() || v < 0.0 {
            return Err(PlannerError::InvalidParameter(format!(
                "{name} must be finite and non-negative (got {v} at position {i})"
            )));
        }
    }
    Ok(())
}
