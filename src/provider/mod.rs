//! Sources of per-product daily history.

mod memory;

pub use memory::InMemoryProvider;

use crate::core::DailySeries;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw sales observation as recorded by the store.
///
/// Several records may share a date; missing values are kept as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    #[serde(alias = "Product ID")]
    pub product_id: String,
    #[serde(default, alias = "Units Sold")]
    pub units_sold: Option<f64>,
    #[serde(default, alias = "Inventory Level")]
    pub inventory_level: Option<f64>,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, product_id: impl Into<String>, units_sold: f64) -> Self {
        Self {
            date,
            product_id: product_id.into(),
            units_sold: Some(units_sold),
            inventory_level: None,
        }
    }

    pub fn with_inventory(mut self, inventory_level: f64) -> Self {
        self.inventory_level = Some(inventory_level);
        self
    }

    /// Units sold, if recorded and numeric.
    pub fn valid_units(&self) -> Option<f64> {
        self.units_sold.filter(|u| u.is_finite())
    }
}

/// Supplies daily-indexed demand history per product.
///
/// Implementations report `DataUnavailable` when no data is loaded at all,
/// `ProductNotFound` for unknown ids and `NoData` when a product has no
/// usable sales observations.
pub trait TimeSeriesProvider: Send + Sync {
    /// Distinct product identifiers.
    fn product_ids(&self) -> Result<Vec<String>>;

    /// Gap-free daily units sold, zero-filled between the first and last
    /// observation, with the day's recorded inventory where present.
    fn daily_series(&self, product_id: &str) -> Result<DailySeries>;

    /// Records with usable units sold for a product, in date order.
    fn records(&self, product_id: &str) -> Result<Vec<SalesRecord>>;
}
