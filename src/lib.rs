//! # demand-planner
//!
//! Daily demand forecasting and inventory policy optimization.
//!
//! Fits ARIMA(5,1,0) or additive Holt-Winters models to a product's daily
//! sales history, then turns the forecast into safety stock, a reorder
//! point, an economic order quantity and a replenishment suggestion.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod planner;
pub mod provider;
pub mod telemetry;
pub mod utils;

pub use error::{PlannerError, Result};

pub mod prelude {
    pub use crate::config::{ForecastRequest, OptimizationParams, PlannerConfig};
    pub use crate::core::{DailyPoint, DailySeries, ForecastResult};
    pub use crate::engine::{
        ForecastEngine, InventoryOptimizer, InventoryPolicy, StockAction, VarianceEstimator,
    };
    pub use crate::error::{PlannerError, Result};
    pub use crate::models::{Forecaster, ModelType};
    pub use crate::planner::InventoryPlanner;
    pub use crate::provider::{InMemoryProvider, SalesRecord, TimeSeriesProvider};
}
