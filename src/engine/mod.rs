//! Forecasting and inventory optimization engines.

mod forecast;
mod inventory;
mod variance;

pub use forecast::ForecastEngine;
pub use inventory::{
    demand_during_lead_time, economic_order_quantity, recommend, safety_stock,
    AnnualDemandMethod, Assumptions, InventoryOptimizer, InventoryPolicy, StockAction,
};
pub use variance::{VarianceEstimate, VarianceEstimator, VarianceMethod};
