//! Selection of forecasting strategies by name.

use crate::error::{PlannerError, Result};
use crate::models::arima::ARIMA;
use crate::models::exponential::HoltWinters;
use crate::models::BoxedForecaster;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Forecasting strategies available to the forecast engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelType {
    /// ARIMA(5,1,0).
    #[default]
    #[serde(rename = "ARIMA", alias = "arima")]
    Arima,
    /// Holt-Winters with additive trend and additive seasonality.
    #[serde(
        rename = "ExponentialSmoothing",
        alias = "exponential_smoothing",
        alias = "holt-winters"
    )]
    ExponentialSmoothing,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arima => "ARIMA",
            Self::ExponentialSmoothing => "ExponentialSmoothing",
        }
    }

    /// Whether the seasonal period affects this strategy.
    pub fn is_seasonal(&self) -> bool {
        matches!(self, Self::ExponentialSmoothing)
    }

    /// Build an unfitted forecaster. `seasonal_period` is validated only for
    /// seasonal strategies.
    pub fn create(&self, seasonal_period: usize) -> Result<BoxedForecaster> {
        match self {
            Self::Arima => Ok(Box::new(ARIMA::default())),
            Self::ExponentialSmoothing => {
                if seasonal_period <= 1 {
                    return Err(PlannerError::InvalidParameter(format!(
                        "seasonal period must be greater than 1, got {seasonal_period}"
                    )));
                }
                Ok(Box::new(HoltWinters::auto(seasonal_period)))
            }
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arima" => Ok(Self::Arima),
            "exponentialsmoothing" | "exponential_smoothing" | "holt-winters" | "holtwinters" => {
                Ok(Self::ExponentialSmoothing)
            }
            _ => Err(PlannerError::InvalidParameter(format!(
                "invalid model type specified: {s}"
            ))),
        }
    }
}
