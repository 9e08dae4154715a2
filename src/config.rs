//! Caller-supplied planning parameters and their defaults.

use crate::error::{PlannerError, Result};
use crate::models::ModelType;
use serde::{Deserialize, Serialize};

/// Trailing window used for the rolling demand standard deviation.
pub const DEFAULT_ROLLING_WINDOW_DAYS: usize = 90;

/// Which model to fit and how far to project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastRequest {
    pub model_type: ModelType,
    /// Number of days to forecast ahead.
    pub forecast_days: usize,
    /// Observations per seasonal cycle; only used by seasonal models.
    pub seasonal_period: usize,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            model_type: ModelType::Arima,
            forecast_days: 30,
            seasonal_period: 7,
        }
    }
}

impl ForecastRequest {
    pub fn new(model_type: ModelType, forecast_days: usize) -> Self {
        Self {
            model_type,
            forecast_days,
            ..Default::default()
        }
    }

    pub fn with_seasonal_period(mut self, seasonal_period: usize) -> Self {
        self.seasonal_period = seasonal_period;
        self
    }

    /// Seasonal period, reported only when the model uses it.
    pub fn seasonal_period_used(&self) -> Option<usize> {
        self.model_type
            .is_seasonal()
            .then_some(self.seasonal_period)
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast_days == 0 {
            return Err(PlannerError::InvalidParameter(
                "forecast days must be a positive integer".to_string(),
            ));
        }
        if self.model_type.is_seasonal() && self.seasonal_period <= 1 {
            return Err(PlannerError::InvalidParameter(format!(
                "seasonal period must be greater than 1, got {}",
                self.seasonal_period
            )));
        }
        Ok(())
    }
}

/// Inventory cost and service parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationParams {
    /// Replenishment lead time in days.
    pub lead_time_days: usize,
    /// Target probability of not stocking out during lead time.
    pub service_level: f64,
    /// Annual cost of holding one unit.
    pub holding_cost_per_unit_year: f64,
    /// Fixed cost per order placed.
    pub ordering_cost_per_order: f64,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        Self {
            lead_time_days: 7,
            service_level: 0.95,
            holding_cost_per_unit_year: 1.50,
            ordering_cost_per_order: 50.00,
        }
    }
}

impl OptimizationParams {
    pub fn validate(&self) -> Result<()> {
        if self.lead_time_days == 0 {
            return Err(PlannerError::InvalidParameter(
                "lead time must be a positive number of days".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.service_level) {
            return Err(PlannerError::InvalidParameter(format!(
                "service level must be within [0, 1], got {}",
                self.service_level
            )));
        }
        for (name, cost) in [
            ("holding cost", self.holding_cost_per_unit_year),
            ("ordering cost", self.ordering_cost_per_order),
        ] {
            if !cost.is_finite() || cost < 0.0 {
                return Err(PlannerError::InvalidParameter(format!(
                    "{name} must be a finite non-negative amount, got {cost}"
                )));
            }
        }
        Ok(())
    }
}

/// Planner-wide configuration: engine settings plus request defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub rolling_window_days: usize,
    pub forecast: ForecastRequest,
    pub optimization: OptimizationParams,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rolling_window_days: DEFAULT_ROLLING_WINDOW_DAYS,
            forecast: ForecastRequest::default(),
            optimization: OptimizationParams::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PlannerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rolling_window_days == 0 {
            return Err(PlannerError::Config(
                "rolling window must be at least one day".to_string(),
            ));
        }
        self.forecast
            .validate()
            .and_then(|_| self.optimization.validate())
            .map_err(|e| PlannerError::Config(e.to_string()))
    }
}
