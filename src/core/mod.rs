//! Core data structures for daily demand planning.

mod daily_series;
mod forecast;

pub use daily_series::{DailyPoint, DailySeries};
pub use forecast::{Forecast, ForecastResult};
