//! Forecasting models.

mod model_type;
mod traits;

pub mod arima;
pub mod exponential;

pub use model_type::ModelType;
pub use traits::{BoxedForecaster, Forecaster};
