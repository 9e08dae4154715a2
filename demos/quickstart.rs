//! Forecast demand for a small synthetic catalogue and print inventory policies.
//!
//! Run with `RUST_LOG=debug` to see fitting details.

use chrono::{Duration, NaiveDate};
use demand_planner::prelude::*;
use demand_planner::telemetry;

fn catalogue() -> Vec<SalesRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut rows = Vec::new();
    let mut stock = 900.0;
    for day in 0..180 {
        let date = start + Duration::days(day);
        let weekday = [4.0, 0.0, -2.0, -3.0, 1.0, 9.0, -9.0][day as usize % 7];
        let steady = 20.0 + weekday + (day % 5) as f64;
        stock = (stock - steady).max(0.0);
        if stock < 150.0 {
            stock += 600.0;
        }
        rows.push(SalesRecord::new(date, "P0001", steady).with_inventory(stock));
        rows.push(SalesRecord::new(date, "P0002", 3.0 + (day % 2) as f64).with_inventory(400.0));
    }
    rows
}

fn main() -> Result<()> {
    telemetry::init();

    let planner = InventoryPlanner::new(InMemoryProvider::new(catalogue()));
    let params = OptimizationParams::default();

    for product_id in planner.product_ids()? {
        for request in [
            ForecastRequest::default(),
            ForecastRequest::new(ModelType::ExponentialSmoothing, 30),
        ] {
            let report = planner.optimize(&product_id, &request, &params)?;
            let policy = &report.policy;
            println!(
                "{product_id} [{}] SS={} ROP={} EOQ={} -> {}",
                report.model_type_used,
                policy.safety_stock,
                policy.reorder_point,
                policy.economic_order_quantity,
                policy.suggestion
            );
        }
    }

    let history = planner.inventory_history("P0001")?;
    let recent = &history[history.len().saturating_sub(3)..];
    println!(
        "{}",
        serde_json::to_string_pretty(recent).map_err(|e| PlannerError::Internal(e.to_string()))?
    );
    Ok(())
}
