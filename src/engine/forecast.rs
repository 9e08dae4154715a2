//! Fit a forecasting strategy to a daily series and project future demand.

use crate::config::ForecastRequest;
use crate::core::{DailySeries, ForecastResult};
use crate::error::{PlannerError, Result};
use crate::models::{Forecaster, ModelType};

/// Produces integer daily demand forecasts.
///
/// The engine is stateless: every call builds and fits a fresh model, so one
/// engine can serve any number of products concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine;

impl ForecastEngine {
    pub fn new() -> Self {
        Self
    }

    /// Forecast `horizon` days past the end of `series` using `model_type`.
    ///
    /// `seasonal_period` is only consulted by seasonal models.
    pub fn forecast(
        &self,
        series: &DailySeries,
        model_type: ModelType,
        horizon: usize,
        seasonal_period: usize,
    ) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        let mut model = model_type.create(seasonal_period)?;
        self.forecast_with(model.as_mut(), series, horizon)
    }

    /// Forecast according to a validated request.
    pub fn forecast_request(
        &self,
        series: &DailySeries,
        request: &ForecastRequest,
    ) -> Result<ForecastResult> {
        request.validate()?;
        self.forecast(
            series,
            request.model_type,
            request.forecast_days,
            request.seasonal_period,
        )
    }

    /// Fit an arbitrary strategy and project it. The model is left fitted so
    /// callers can inspect residuals or parameters afterwards.
    pub fn forecast_with(
        &self,
        model: &mut dyn Forecaster,
        series: &DailySeries,
        horizon: usize,
    ) -> Result<ForecastResult> {
        check_horizon(horizon)?;

        let needed = model.min_observations();
        if series.len() < needed {
            return Err(PlannerError::InsufficientData {
                needed,
                got: series.len(),
            });
        }

        tracing::info!(
            model = model.name(),
            params = %model.describe_params(),
            observations = series.len(),
            horizon,
            "fitting forecast model"
        );

        model.fit(series).map_err(|e| annotate(e, &*model))?;
        let projection = model.predict(horizon).map_err(|e| annotate(e, &*model))?;

        if projection.horizon() != horizon {
            return Err(PlannerError::Internal(format!(
                "{} produced {} values for a horizon of {horizon}",
                model.name(),
                projection.horizon()
            )));
        }
        if let Some(step) = projection.first_non_finite() {
            return Err(PlannerError::fit_failure(
                model.name(),
                model.describe_params(),
                format!("projection is not finite at step {}", step + 1),
            ));
        }

        let result = ForecastResult::from_projection(series.forecast_start(), &projection)?;
        tracing::info!(
            model = model.name(),
            start = %result.start(),
            total = result.sum_first(result.horizon()),
            "forecast complete"
        );
        Ok(result)
    }
}

fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(PlannerError::InvalidParameter(
            "forecast days must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Attach model details to errors that do not already describe the input.
fn annotate(err: PlannerError, model: &dyn Forecaster) -> PlannerError {
    match err {
        PlannerError::ModelFitFailure { .. }
        | PlannerError::InvalidParameter(_)
        | PlannerError::InsufficientData { .. } => err,
        other => PlannerError::fit_failure(model.name(), model.describe_params(), other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Forecast;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn weekly_series(n: usize) -> DailySeries {
        let values = (0..n)
            .map(|i| 40.0 + 0.2 * i as f64 + [6.0, -2.0, -4.0, 0.0, 3.0, 9.0, -12.0][i % 7])
            .collect();
        DailySeries::new(start(), values).unwrap()
    }

    #[test]
    fn arima_forecast_has_requested_horizon() {
        let series = weekly_series(60);
        let result = ForecastEngine::new()
            .forecast(&series, ModelType::Arima, 14, 7)
            .unwrap();
        assert_eq!(result.horizon(), 14);
        assert_eq!(result.start(), NaiveDate::from_ymd_opt(2023, 3, 2).unwrap());
    }

    #[test]
    fn holt_winters_follows_weekly_pattern() {
        let series = weekly_series(70);
        let result = ForecastEngine::new()
            .forecast(&series, ModelType::ExponentialSmoothing, 7, 7)
            .unwrap();
        let values = result.values();
        // Day 70 falls on pattern slot 0 (+6), day 75 on slot 5 (+9), day 76 on slot 6 (-12).
        assert!(values[6] < values[5]);
        assert!(values[6] < values[0]);
    }

    #[test]
    fn zero_horizon_is_rejected_for_every_model() {
        let series = weekly_series(30);
        for model in [ModelType::Arima, ModelType::ExponentialSmoothing] {
            assert!(matches!(
                ForecastEngine::new().forecast(&series, model, 0, 7),
                Err(PlannerError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn short_history_is_insufficient() {
        let series = weekly_series(9);
        assert_eq!(
            ForecastEngine::new().forecast(&series, ModelType::Arima, 5, 7),
            Err(PlannerError::InsufficientData { needed: 10, got: 9 })
        );

        let series = weekly_series(13);
        assert_eq!(
            ForecastEngine::new().forecast(&series, ModelType::ExponentialSmoothing, 5, 7),
            Err(PlannerError::InsufficientData { needed: 14, got: 13 })
        );
    }

    #[test]
    fn seasonal_period_is_validated_before_data_length() {
        let series = weekly_series(3);
        assert!(matches!(
            ForecastEngine::new().forecast(&series, ModelType::ExponentialSmoothing, 5, 1),
            Err(PlannerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn constant_series_forecasts_constant_demand() {
        let series = DailySeries::new(start(), vec![10.0; 100]).unwrap();
        let result = ForecastEngine::new()
            .forecast(&series, ModelType::Arima, 30, 7)
            .unwrap();
        assert!(result.values().iter().all(|&v| v == 10));
    }

    #[test]
    fn request_is_validated() {
        let series = weekly_series(30);
        let request = ForecastRequest::new(ModelType::Arima, 0);
        assert!(ForecastEngine::new()
            .forecast_request(&series, &request)
            .is_err());

        let request = ForecastRequest::new(ModelType::ExponentialSmoothing, 10);
        let result = ForecastEngine::new()
            .forecast_request(&series, &request)
            .unwrap();
        assert_eq!(result.horizon(), 10);
    }

    struct Diverging;

    impl Forecaster for Diverging {
        fn fit(&mut self, _series: &DailySeries) -> Result<()> {
            Ok(())
        }
        fn predict(&self, horizon: usize) -> Result<Forecast> {
            let mut values = vec![1.0; horizon];
            if let Some(last) = values.last_mut() {
                *last = f64::INFINITY;
            }
            Ok(Forecast::from_values(values))
        }
        fn fitted_values(&self) -> Option<&[f64]> {
            None
        }
        fn residuals(&self) -> Option<&[f64]> {
            None
        }
        fn name(&self) -> &str {
            "Diverging"
        }
        fn min_observations(&self) -> usize {
            1
        }
        fn describe_params(&self) -> String {
            "none".to_string()
        }
    }

    #[test]
    fn non_finite_projection_is_a_fit_failure() {
        let series = weekly_series(5);
        let err = ForecastEngine::new()
            .forecast_with(&mut Diverging, &series, 3)
            .unwrap_err();
        match err {
            PlannerError::ModelFitFailure { model, reason, .. } => {
                assert_eq!(model, "Diverging");
                assert!(reason.contains("step 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn forecast_with_leaves_model_fitted() {
        let series = weekly_series(40);
        let mut model = crate::models::arima::ARIMA::default();
        ForecastEngine::new()
            .forecast_with(&mut model, &series, 3)
            .unwrap();
        assert!(model.is_fitted());
    }
}
