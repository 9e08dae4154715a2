//! Safety stock, reorder point and order quantity from a demand forecast.

use crate::config::OptimizationParams;
use crate::core::{DailySeries, ForecastResult};
use crate::engine::variance::{VarianceEstimate, VarianceEstimator, VarianceMethod};
use crate::error::{PlannerError, Result};
use crate::utils::z_score;
use serde::{Deserialize, Serialize};
use std::fmt;

const DAYS_PER_YEAR: f64 = 365.0;

/// Recommended replenishment action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockAction {
    /// Stock is at or below the reorder point; place an order.
    Order { quantity: u64 },
    /// Stock is at or below the reorder point but no positive quantity can
    /// be derived from the cost parameters.
    ReviewParameters,
    /// Stock exceeds the reorder point by more than one replenishment cycle.
    Overstock,
    Maintain,
}

impl StockAction {
    /// Human-readable suggestion for the planner's dashboard.
    pub fn describe(&self, current: u64, reorder_point: u64, safety_stock: u64) -> String {
        match self {
            Self::Order { quantity } => {
                format!("Order {quantity} units (Current: {current}, ROP: {reorder_point}).")
            }
            Self::ReviewParameters => {
                "Maintain current stock (Consider reviewing EOQ parameters).".to_string()
            }
            Self::Overstock => format!(
                "Potential overstock (Current: {current}, ROP: {reorder_point}, SS: {safety_stock})."
            ),
            Self::Maintain => "Maintain current stock.".to_string(),
        }
    }
}

/// How annual demand was derived for the EOQ calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnualDemandMethod {
    ForecastAverage,
    EmptyForecast,
}

impl AnnualDemandMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForecastAverage => "forecast-average",
            Self::EmptyForecast => "empty-forecast",
        }
    }
}

impl fmt::Display for AnnualDemandMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs and derived figures behind a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub lead_time_days: usize,
    /// Service level as a percentage, rounded to two decimals.
    pub service_level_percent: f64,
    pub holding_cost_per_unit_year: f64,
    pub ordering_cost_per_order: f64,
    pub demand_variability_method: VarianceMethod,
    pub demand_std_dev: f64,
    pub annual_demand: f64,
    pub annual_demand_method: AnnualDemandMethod,
    /// Number of forecast days summed into the lead-time demand.
    pub lead_time_days_covered: usize,
    /// The forecast was shorter than the lead time.
    pub lead_time_demand_truncated: bool,
}

/// Inventory policy for one product.
///
/// `reorder_point == demand_during_lead_time + safety_stock` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPolicy {
    pub product_id: String,
    pub current_inventory: u64,
    pub safety_stock: u64,
    pub reorder_point: u64,
    pub economic_order_quantity: u64,
    pub demand_during_lead_time: u64,
    pub action: StockAction,
    pub suggestion: String,
    pub assumptions: Assumptions,
}

/// Turns a demand forecast into safety stock, reorder point and EOQ.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryOptimizer {
    variance: VarianceEstimator,
}

impl InventoryOptimizer {
    pub fn new(variance: VarianceEstimator) -> Self {
        Self { variance }
    }

    /// Use a custom rolling window for demand variability.
    pub fn with_window(window_days: usize) -> Result<Self> {
        VarianceEstimator::new(window_days).map(Self::new)
    }

    pub fn variance_estimator(&self) -> &VarianceEstimator {
        &self.variance
    }

    pub fn optimize(
        &self,
        product_id: &str,
        forecast: &ForecastResult,
        params: &OptimizationParams,
        history: &DailySeries,
    ) -> Result<InventoryPolicy> {
        params.validate()?;

        let variance = self.variance.estimate(history);
        tracing::debug!(
            product_id,
            std_dev = variance.std_dev,
            method = %variance.method,
            "estimated demand variability"
        );

        let z = z_score(params.service_level)?;
        let safety_stock = safety_stock(z, params.lead_time_days, variance.std_dev)?;

        let (demand_during_lead_time, days_covered) =
            demand_during_lead_time(forecast, params.lead_time_days);
        let truncated = days_covered < params.lead_time_days;
        if truncated {
            tracing::warn!(
                product_id,
                forecast_days = forecast.horizon(),
                lead_time_days = params.lead_time_days,
                "forecast shorter than lead time, lead-time demand covers only the forecast"
            );
        }
        let reorder_point = demand_during_lead_time
            .checked_add(safety_stock)
            .ok_or_else(|| {
                PlannerError::Internal(format!(
                    "reorder point overflows (lead-time demand {demand_during_lead_time}, safety stock {safety_stock})"
                ))
            })?;

        let (annual_demand, annual_demand_method) = match forecast.mean() {
            Some(mean) => (mean * DAYS_PER_YEAR, AnnualDemandMethod::ForecastAverage),
            None => {
                tracing::warn!(product_id, "empty forecast, annual demand taken as zero");
                (0.0, AnnualDemandMethod::EmptyForecast)
            }
        };
        let economic_order_quantity = economic_order_quantity(
            annual_demand,
            params.ordering_cost_per_order,
            params.holding_cost_per_unit_year,
        );

        let current_inventory = match history.latest_inventory() {
            Some(level) => level.floor() as u64,
            None => {
                tracing::warn!(
                    product_id,
                    "no inventory recorded on the latest day, assuming zero on hand"
                );
                0
            }
        };

        let action = recommend(
            current_inventory,
            reorder_point,
            safety_stock,
            economic_order_quantity,
        );
        let suggestion = action.describe(current_inventory, reorder_point, safety_stock);

        tracing::info!(
            product_id,
            safety_stock,
            reorder_point,
            economic_order_quantity,
            current_inventory,
            "inventory policy computed"
        );

        Ok(InventoryPolicy {
            product_id: product_id.to_string(),
            current_inventory,
            safety_stock,
            reorder_point,
            economic_order_quantity,
            demand_during_lead_time,
            action,
            suggestion,
            assumptions: assumptions(
                params,
                &variance,
                annual_demand,
                annual_demand_method,
                days_covered,
                truncated,
            ),
        })
    }
}

fn assumptions(
    params: &OptimizationParams,
    variance: &VarianceEstimate,
    annual_demand: f64,
    annual_demand_method: AnnualDemandMethod,
    days_covered: usize,
    truncated: bool,
) -> Assumptions {
    Assumptions {
        lead_time_days: params.lead_time_days,
        service_level_percent: (params.service_level * 100.0 * 100.0).round() / 100.0,
        holding_cost_per_unit_year: params.holding_cost_per_unit_year,
        ordering_cost_per_order: params.ordering_cost_per_order,
        demand_variability_method: variance.method,
        demand_std_dev: variance.std_dev,
        annual_demand,
        annual_demand_method,
        lead_time_days_covered: days_covered,
        lead_time_demand_truncated: truncated,
    }
}

/// `ceil(z * sqrt(lead_time) * std_dev)`, or zero when that is not positive.
///
/// An infinite result (a 100% service level with non-zero variability), or
/// one too large to count in whole units, is reported as an error.
pub fn safety_stock(z: f64, lead_time_days: usize, std_dev: f64) -> Result<u64> {
    let raw = z * (lead_time_days as f64).sqrt() * std_dev;
    if raw.is_nan() || raw <= 0.0 {
        return Ok(0);
    }
    if raw.is_infinite() {
        return Err(PlannerError::Internal(format!(
            "safety stock is unbounded (z = {z}, std dev = {std_dev})"
        )));
    }
    if raw >= u64::MAX as f64 {
        return Err(PlannerError::Internal(format!(
            "safety stock {raw:e} exceeds the representable range"
        )));
    }
    Ok(raw.ceil() as u64)
}

/// Forecast demand over the lead time and the number of days it covers.
///
/// Forecasts shorter than the lead time are summed as-is, not extrapolated.
pub fn demand_during_lead_time(forecast: &ForecastResult, lead_time_days: usize) -> (u64, usize) {
    let days = lead_time_days.min(forecast.horizon());
    (forecast.sum_first(days), days)
}

/// Economic order quantity `ceil(sqrt(2DS / H))`.
///
/// Zero when annual demand or holding cost is not positive, or the ordering
/// cost is negative.
pub fn economic_order_quantity(annual_demand: f64, ordering_cost: f64, holding_cost: f64) -> u64 {
    if !(annual_demand > 0.0 && holding_cost > 0.0 && ordering_cost >= 0.0) {
        return 0;
    }
    let eoq = (2.0 * annual_demand * ordering_cost / holding_cost).sqrt();
    if eoq.is_finite() {
        eoq.ceil() as u64
    } else {
        0
    }
}

/// Choose the replenishment action for the current stock position.
pub fn recommend(
    current_inventory: u64,
    reorder_point: u64,
    safety_stock: u64,
    economic_order_quantity: u64,
) -> StockAction {
    if current_inventory <= reorder_point {
        let quantity = if economic_order_quantity > 0 {
            economic_order_quantity
        } else {
            reorder_point
                .saturating_add(safety_stock)
                .saturating_sub(current_inventory)
        };
        return if quantity > 0 {
            StockAction::Order { quantity }
        } else {
            StockAction::ReviewParameters
        };
    }

    let cycle_stock = economic_order_quantity.max(safety_stock);
    if current_inventory > reorder_point.saturating_add(cycle_stock) {
        StockAction::Overstock
    } else {
        StockAction::Maintain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn history(values: Vec<f64>, latest_inventory: Option<f64>) -> DailySeries {
        let mut inventory = vec![None; values.len()];
        if let Some(last) = inventory.last_mut() {
            *last = latest_inventory;
        }
        DailySeries::new(start(), values)
            .unwrap()
            .with_inventory(inventory)
            .unwrap()
    }

    fn flat_forecast(value: u64, days: usize) -> ForecastResult {
        ForecastResult::new(NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(), vec![value; days])
    }

    #[test]
    fn constant_demand_policy() {
        let policy = InventoryOptimizer::default()
            .optimize(
                "P0001",
                &flat_forecast(10, 30),
                &OptimizationParams::default(),
                &history(vec![10.0; 100], Some(200.0)),
            )
            .unwrap();

        assert_eq!(policy.safety_stock, 0);
        assert_eq!(policy.demand_during_lead_time, 70);
        assert_eq!(policy.reorder_point, 70);
        assert_eq!(policy.assumptions.annual_demand, 3650.0);
        assert_eq!(policy.economic_order_quantity, 494);
        assert_eq!(policy.current_inventory, 200);
        assert_eq!(policy.action, StockAction::Maintain);
        assert_eq!(policy.suggestion, "Maintain current stock.");
        assert_eq!(policy.assumptions.service_level_percent, 95.0);
        assert_eq!(
            policy.assumptions.demand_variability_method,
            VarianceMethod::Rolling
        );
    }

    #[test]
    fn variable_demand_needs_safety_stock() {
        let values: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 5.0 } else { 15.0 }).collect();
        let policy = InventoryOptimizer::default()
            .optimize(
                "P0002",
                &flat_forecast(10, 30),
                &OptimizationParams::default(),
                &history(values, Some(10.0)),
            )
            .unwrap();

        // 90-day window of alternating 5/15: sample std = 5 * sqrt(90/89).
        let sigma = 5.0 * (90.0f64 / 89.0).sqrt();
        let expected = (1.6448536269514722 * 7.0f64.sqrt() * sigma).ceil() as u64;
        assert_eq!(policy.safety_stock, expected);
        assert_eq!(policy.reorder_point, 70 + expected);
        assert_eq!(
            policy.action,
            StockAction::Order { quantity: 494 }
        );
        assert_eq!(
            policy.suggestion,
            format!("Order 494 units (Current: 10, ROP: {}).", 70 + expected)
        );
    }

    #[test]
    fn tiny_history_has_no_safety_stock() {
        let policy = InventoryOptimizer::default()
            .optimize(
                "P0003",
                &flat_forecast(3, 10),
                &OptimizationParams::default(),
                &history(vec![3.0], None),
            )
            .unwrap();
        assert_eq!(policy.safety_stock, 0);
        assert_eq!(
            policy.assumptions.demand_variability_method,
            VarianceMethod::InsufficientData
        );
        assert_eq!(policy.current_inventory, 0);
    }

    #[test]
    fn short_forecast_truncates_lead_time_demand() {
        let forecast = ForecastResult::new(start(), vec![1, 2, 3, 4, 5]);
        let policy = InventoryOptimizer::default()
            .optimize(
                "P0004",
                &forecast,
                &OptimizationParams::default(),
                &history(vec![3.0; 20], Some(100.0)),
            )
            .unwrap();
        assert_eq!(policy.demand_during_lead_time, 15);
        assert!(policy.assumptions.lead_time_demand_truncated);
        assert_eq!(policy.assumptions.lead_time_days_covered, 5);
    }

    #[test]
    fn empty_forecast_has_zero_annual_demand() {
        let forecast = ForecastResult::new(start(), vec![]);
        let policy = InventoryOptimizer::default()
            .optimize(
                "P0005",
                &forecast,
                &OptimizationParams::default(),
                &history(vec![3.0; 20], Some(0.0)),
            )
            .unwrap();
        assert_eq!(policy.economic_order_quantity, 0);
        assert_eq!(
            policy.assumptions.annual_demand_method,
            AnnualDemandMethod::EmptyForecast
        );
        // current 0 <= ROP 0, EOQ 0 and ROP + SS - current == 0
        assert_eq!(policy.action, StockAction::ReviewParameters);
        assert_eq!(
            policy.suggestion,
            "Maintain current stock (Consider reviewing EOQ parameters)."
        );
    }

    #[test]
    fn full_service_level_with_variability_is_an_error() {
        let params = OptimizationParams {
            service_level: 1.0,
            ..Default::default()
        };
        let result = InventoryOptimizer::default().optimize(
            "P0006",
            &flat_forecast(10, 30),
            &params,
            &history(vec![1.0, 5.0, 9.0], Some(3.0)),
        );
        assert!(matches!(result, Err(PlannerError::Internal(_))));
    }

    #[test]
    fn demand_spike_beyond_whole_units_is_an_error() {
        let mut values = vec![0.0; 20];
        values[3] = 1e30;
        let result = InventoryOptimizer::default().optimize(
            "P0009",
            &flat_forecast(10, 30),
            &OptimizationParams::default(),
            &history(values, Some(5.0)),
        );
        assert!(matches!(result, Err(PlannerError::Internal(_))));
    }

    #[test]
    fn saturated_forecast_does_not_overflow() {
        let forecast = flat_forecast(u64::MAX, 30);
        let policy = InventoryOptimizer::default()
            .optimize(
                "P0010",
                &forecast,
                &OptimizationParams::default(),
                &history(vec![4.0; 30], Some(5.0)),
            )
            .unwrap();
        assert_eq!(policy.demand_during_lead_time, u64::MAX);
        assert_eq!(policy.reorder_point, u64::MAX);
        assert_eq!(policy.safety_stock, 0);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = OptimizationParams {
            lead_time_days: 0,
            ..Default::default()
        };
        let result = InventoryOptimizer::default().optimize(
            "P0007",
            &flat_forecast(10, 30),
            &params,
            &history(vec![10.0; 30], Some(3.0)),
        );
        assert!(matches!(result, Err(PlannerError::InvalidParameter(_))));
    }

    #[test]
    fn safety_stock_edges() {
        assert_eq!(safety_stock(1.645, 7, 0.0).unwrap(), 0);
        assert_eq!(safety_stock(-1.0, 7, 3.0).unwrap(), 0);
        assert_eq!(safety_stock(f64::NEG_INFINITY, 7, 3.0).unwrap(), 0);
        assert_eq!(safety_stock(f64::INFINITY, 7, 0.0).unwrap(), 0);
        assert_eq!(safety_stock(1.0, 4, 2.5).unwrap(), 5);
        assert_eq!(safety_stock(1.0, 4, 2.6).unwrap(), 6);
        assert!(safety_stock(f64::INFINITY, 7, 3.0).is_err());
        assert!(matches!(
            safety_stock(1.0, 1, 1e20),
            Err(PlannerError::Internal(_))
        ));
    }

    #[test]
    fn eoq_zero_cases() {
        assert_eq!(economic_order_quantity(0.0, 50.0, 1.5), 0);
        assert_eq!(economic_order_quantity(3650.0, 50.0, 0.0), 0);
        assert_eq!(economic_order_quantity(3650.0, -1.0, 1.5), 0);
        assert_eq!(economic_order_quantity(3650.0, 0.0, 1.5), 0);
        assert_eq!(economic_order_quantity(3650.0, 50.0, 1.5), 494);
    }

    #[test]
    fn recommendation_ladder() {
        assert_eq!(recommend(50, 70, 10, 100), StockAction::Order { quantity: 100 });
        assert_eq!(recommend(70, 70, 10, 0), StockAction::Order { quantity: 10 });
        assert_eq!(recommend(0, 0, 0, 0), StockAction::ReviewParameters);
        // threshold is ROP + max(EOQ, SS)
        assert_eq!(recommend(170, 70, 10, 100), StockAction::Maintain);
        assert_eq!(recommend(171, 70, 10, 100), StockAction::Overstock);
        assert_eq!(recommend(81, 70, 10, 0), StockAction::Overstock);
        assert_eq!(recommend(80, 70, 10, 0), StockAction::Maintain);
        assert_eq!(
            recommend(0, u64::MAX, 5, 0),
            StockAction::Order { quantity: u64::MAX }
        );
        assert_eq!(recommend(u64::MAX, 70, 10, 100), StockAction::Overstock);
    }

    #[test]
    fn overstock_suggestion_reports_safety_stock() {
        assert_eq!(
            StockAction::Overstock.describe(500, 70, 12),
            "Potential overstock (Current: 500, ROP: 70, SS: 12)."
        );
    }

    #[test]
    fn optimization_is_deterministic() {
        let values: Vec<f64> = (0..60).map(|i| (i % 9) as f64 * 2.0).collect();
        let optimizer = InventoryOptimizer::with_window(30).unwrap();
        let run = || {
            optimizer
                .optimize(
                    "P0008",
                    &flat_forecast(8, 14),
                    &OptimizationParams::default(),
                    &history(values.clone(), Some(42.0)),
                )
                .unwrap()
        };
        assert_eq!(run(), run());
    }
}
