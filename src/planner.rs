//! Facade wiring a data provider to the forecast and inventory engines.

use crate::config::{ForecastRequest, OptimizationParams, PlannerConfig};
use crate::core::ForecastResult;
use crate::engine::{ForecastEngine, InventoryOptimizer, InventoryPolicy};
use crate::error::Result;
use crate::models::ModelType;
use crate::provider::{SalesRecord, TimeSeriesProvider};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecast for one product together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub product_id: String,
    pub model_type: ModelType,
    pub forecast_days: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_period_used: Option<usize>,
    pub forecast: ForecastResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub policy: InventoryPolicy,
    pub model_type_used: ModelType,
    pub forecast_days_used: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_period_used: Option<usize>,
}

/// A row of the historical inventory view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub inventory_level: Option<u64>,
    pub units_sold: Option<u64>,
}

impl From<SalesRecord> for InventoryRecord {
    /// Quantities are reported in whole units, floored.
    fn from(record: SalesRecord) -> Self {
        let whole = |v: f64| v.is_finite().then(|| v.max(0.0).floor() as u64);
        Self {
            date: record.date,
            inventory_level: record.inventory_level.and_then(whole),
            units_sold: record.units_sold.and_then(whole),
        }
    }
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Answers forecast, optimization and history queries for products held by
/// a [`TimeSeriesProvider`].
#[derive(Debug, Clone)]
pub struct InventoryPlanner<P> {
    provider: P,
    engine: ForecastEngine,
    optimizer: InventoryOptimizer,
    config: PlannerConfig,
}

impl<P: TimeSeriesProvider> InventoryPlanner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            engine: ForecastEngine::new(),
            optimizer: InventoryOptimizer::default(),
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(provider: P, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            engine: ForecastEngine::new(),
            optimizer: InventoryOptimizer::with_window(config.rolling_window_days)?,
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn product_ids(&self) -> Result<Vec<String>> {
        let ids = self.provider.product_ids()?;
        tracing::info!(count = ids.len(), "listing products");
        Ok(ids)
    }

    pub fn forecast(&self, product_id: &str, request: &ForecastRequest) -> Result<ForecastReport> {
        tracing::info!(
            product_id,
            model = %request.model_type,
            forecast_days = request.forecast_days,
            seasonal_period = request.seasonal_period,
            "forecast requested"
        );
        let result = self.run_forecast(product_id, request);
        log_outcome(product_id, "forecast", &result);

        let forecast = result?;
        Ok(ForecastReport {
            product_id: product_id.to_string(),
            model_type: request.model_type,
            forecast_days: request.forecast_days,
            seasonal_period_used: request.seasonal_period_used(),
            forecast,
        })
    }

    /// Forecast with the configured default request.
    pub fn forecast_default(&self, product_id: &str) -> Result<ForecastReport> {
        let request = self.config.forecast;
        self.forecast(product_id, &request)
    }

    pub fn optimize(
        &self,
        product_id: &str,
        request: &ForecastRequest,
        params: &OptimizationParams,
    ) -> Result<OptimizationReport> {
        tracing::info!(
            product_id,
            model = %request.model_type,
            forecast_days = request.forecast_days,
            lead_time_days = params.lead_time_days,
            service_level = params.service_level,
            holding_cost = params.holding_cost_per_unit_year,
            ordering_cost = params.ordering_cost_per_order,
            "optimization requested"
        );
        let result = params.validate().and_then(|_| {
            let history = self.provider.daily_series(product_id)?;
            let forecast = self.engine.forecast_request(&history, request)?;
            self.optimizer
                .optimize(product_id, &forecast, params, &history)
        });
        log_outcome(product_id, "optimization", &result);

        Ok(OptimizationReport {
            policy: result?,
            model_type_used: request.model_type,
            forecast_days_used: request.forecast_days,
            seasonal_period_used: request.seasonal_period_used(),
        })
    }

    /// Optimize with the configured default request and parameters.
    pub fn optimize_default(&self, product_id: &str) -> Result<OptimizationReport> {
        let PlannerConfig {
            forecast,
            optimization,
            ..
        } = self.config;
        self.optimize(product_id, &forecast, &optimization)
    }

    /// Date-ordered inventory and sales rows for a product.
    pub fn inventory_history(&self, product_id: &str) -> Result<Vec<InventoryRecord>> {
        let records = self.provider.records(product_id)?;
        tracing::info!(product_id, rows = records.len(), "inventory history requested");
        Ok(records.into_iter().map(InventoryRecord::from).collect())
    }

    fn run_forecast(&self, product_id: &str, request: &ForecastRequest) -> Result<ForecastResult> {
        request.validate()?;
        let history = self.provider.daily_series(product_id)?;
        self.engine.forecast_request(&history, request)
    }
}

fn log_outcome<T>(product_id: &str, operation: &str, result: &Result<T>) {
    match result {
        Ok(_) => tracing::info!(product_id, operation, "request succeeded"),
        Err(err) if err.is_client_error() => {
            tracing::warn!(product_id, operation, error = %err, "request rejected")
        }
        Err(err) => tracing::error!(product_id, operation, error = %err, "request failed"),
    }
}
