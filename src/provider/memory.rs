use crate::core::{DailyPoint, DailySeries};
use crate::error::{PlannerError, Result};
use crate::provider::{SalesRecord, TimeSeriesProvider};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Provider over a fixed set of sales records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    records: Vec<SalesRecord>,
}

impl InMemoryProvider {
    /// Records may arrive in any order; they are kept sorted by date, ties in
    /// arrival order.
    pub fn new(records: impl IntoIterator<Item = SalesRecord>) -> Self {
        let mut records: Vec<_> = records.into_iter().collect();
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    /// Load records from a JSON array.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<SalesRecord> =
            serde_json::from_str(json).map_err(|e| PlannerError::Config(e.to_string()))?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn loaded(&self) -> Result<&[SalesRecord]> {
        if self.records.is_empty() {
            return Err(PlannerError::DataUnavailable);
        }
        Ok(&self.records)
    }

    fn product_records(&self, product_id: &str) -> Result<Vec<&SalesRecord>> {
        let rows: Vec<_> = self
            .loaded()?
            .iter()
            .filter(|r| r.product_id == product_id)
            .collect();
        if rows.is_empty() {
            return Err(PlannerError::ProductNotFound(product_id.to_string()));
        }
        Ok(rows)
    }
}

impl TimeSeriesProvider for InMemoryProvider {
    fn product_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        for record in self.loaded()? {
            if !ids.contains(&record.product_id) {
                ids.push(record.product_id.clone());
            }
        }
        Ok(ids)
    }

    fn daily_series(&self, product_id: &str) -> Result<DailySeries> {
        let mut days: BTreeMap<NaiveDate, (f64, Option<f64>)> = BTreeMap::new();
        for record in self.product_records(product_id)? {
            let Some(units) = record.valid_units() else {
                continue;
            };
            let day = days.entry(record.date).or_insert((0.0, None));
            day.0 += units;
            day.1 = record.inventory_level;
        }

        let (Some(&first), Some(&last)) = (days.keys().next(), days.keys().next_back()) else {
            return Err(PlannerError::NoData(product_id.to_string()));
        };

        let span = (last - first).num_days() + 1;
        let points = (0..span)
            .map(|offset| {
                let date = first + Duration::days(offset);
                let (units, inventory) = days.get(&date).copied().unwrap_or((0.0, None));
                DailyPoint {
                    date,
                    units,
                    inventory,
                }
            })
            .collect();

        let series = DailySeries::from_points(points)?;
        tracing::debug!(
            product_id,
            days = series.len(),
            start = %series.start(),
            "built daily series"
        );
        Ok(series)
    }

    fn records(&self, product_id: &str) -> Result<Vec<SalesRecord>> {
        let rows: Vec<SalesRecord> = self
            .product_records(product_id)?
            .into_iter()
            .filter(|r| r.valid_units().is_some())
            .cloned()
            .collect();
        if rows.is_empty() {
            return Err(PlannerError::NoData(product_id.to_string()));
        }
        Ok(rows)
    }
}
