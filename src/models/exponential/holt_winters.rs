//! Holt-Winters forecasting model with additive trend and additive
//! seasonality.

use crate::core::{DailySeries, Forecast};
use crate::error::{PlannerError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Fewest observations any Holt-Winters fit accepts, regardless of period.
pub const MIN_OBSERVATIONS: usize = 10;

const PARAM_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SmoothingParams {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        let (lo, hi) = PARAM_BOUNDS;
        Self {
            alpha: alpha.clamp(lo, hi),
            beta: beta.clamp(lo, hi),
            gamma: gamma.clamp(lo, hi),
        }
    }
}

/// Final states and in-sample diagnostics of one smoothing pass.
#[derive(Debug, Clone)]
struct SmoothingPass {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    sse: f64,
}

/// Holt-Winters forecaster.
///
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
#[derive(Debug, Clone)]
pub struct HoltWinters {
    params: Option<SmoothingParams>,
    seasonal_period: usize,
    optimize: bool,
    pass: Option<SmoothingPass>,
    n: usize,
}

impl HoltWinters {
    /// Model with fixed smoothing parameters.
    pub fn new(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self {
            params: Some(SmoothingParams::new(alpha, beta, gamma)),
            seasonal_period,
            optimize: false,
            pass: None,
            n: 0,
        }
    }

    /// Model whose smoothing parameters are estimated by minimising the
    /// in-sample squared one-step errors.
    pub fn auto(seasonal_period: usize) -> Self {
        Self {
            params: None,
            seasonal_period,
            optimize: true,
            pass: None,
            n: 0,
        }
    }

    /// Smoothing parameters (estimated ones after `fit`).
    pub fn params(&self) -> Option<SmoothingParams> {
        self.params
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn level(&self) -> Option<f64> {
        self.pass.as_ref().map(|p| p.level)
    }

    pub fn trend(&self) -> Option<f64> {
        self.pass.as_ref().map(|p| p.trend)
    }

    pub fn seasonals(&self) -> Option<&[f64]> {
        self.pass.as_ref().map(|p| p.seasonals.as_slice())
    }

    /// In-sample sum of squared one-step errors.
    pub fn sse(&self) -> Option<f64> {
        self.pass.as_ref().map(|p| p.sse)
    }

    /// Initial level, trend and (zero-sum) seasonal indices from the first
    /// two seasons.
    fn initialize_state(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
        let first_season = &values[..period];
        let level = first_season.iter().sum::<f64>() / period as f64;

        let trend = (0..period)
            .map(|i| (values[period + i] - values[i]) / period as f64)
            .sum::<f64>()
            / period as f64;

        let mut seasonals: Vec<f64> = first_season.iter().map(|y| y - level).collect();
        let offset = seasonals.iter().sum::<f64>() / period as f64;
        seasonals.iter_mut().for_each(|s| *s -= offset);

        (level, trend, seasonals)
    }

    fn smooth(values: &[f64], period: usize, params: SmoothingParams) -> SmoothingPass {
        let SmoothingParams { alpha, beta, gamma } = params;
        let (mut level, mut trend, mut seasonals) = Self::initialize_state(values, period);

        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());
        let mut sse = 0.0;

        // The first season only seeds the state.
        for &y in &values[..period] {
            fitted.push(y);
            residuals.push(0.0);
        }

        for (t, &y) in values.iter().enumerate().skip(period) {
            let idx = t % period;
            let s = seasonals[idx];
            let forecast = level + trend + s;
            let error = y - forecast;
            fitted.push(forecast);
            residuals.push(error);
            sse += error * error;

            let level_prev = level;
            level = alpha * (y - s) + (1.0 - alpha) * (level_prev + trend);
            trend = beta * (level - level_prev) + (1.0 - beta) * trend;
            seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
        }

        SmoothingPass {
            level,
            trend,
            seasonals,
            fitted,
            residuals,
            sse,
        }
    }

    fn optimize_params(&self, values: &[f64]) -> Result<SmoothingParams> {
        let period = self.seasonal_period;
        let initial = SmoothingParams::new(0.3, 0.1, 0.1);
        let scale = Self::smooth(values, period, initial).sse;
        if !scale.is_finite() {
            return Err(self.fit_error("sum of squared errors is not finite"));
        }

        let config = NelderMeadConfig {
            max_iter: 5_000,
            tolerance: 1e-10 * (1.0 + scale),
            ..Default::default()
        };
        let result = nelder_mead(
            |p| Self::smooth(values, period, SmoothingParams::new(p[0], p[1], p[2])).sse,
            &[initial.alpha, initial.beta, initial.gamma],
            Some(&[PARAM_BOUNDS; 3]),
            config,
        );

        if !result.optimal_value.is_finite() {
            return Err(self.fit_error("sum of squared errors is not finite"));
        }
        if !result.converged {
            return Err(self.fit_error(format!(
                "smoothing parameter search did not converge after {} iterations",
                result.iterations
            )));
        }
        let p = &result.optimal_point;
        Ok(SmoothingParams::new(p[0], p[1], p[2]))
    }

    fn fit_error(&self, reason: impl Into<String>) -> PlannerError {
        PlannerError::fit_failure(self.name(), self.describe_params(), reason)
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::auto(7)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let period = self.seasonal_period;
        if period <= 1 {
            return Err(PlannerError::InvalidParameter(format!(
                "seasonal period must be greater than 1, got {period}"
            )));
        }
        let values = series.values();
        let needed = self.min_observations();
        if values.len() < needed {
            return Err(PlannerError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let params = match self.params {
            Some(params) if !self.optimize => params,
            _ => self.optimize_params(values)?,
        };

        let pass = Self::smooth(values, period, params);
        if ![pass.level, pass.trend, pass.sse]
            .iter()
            .chain(&pass.seasonals)
            .all(|v| v.is_finite())
        {
            return Err(self.fit_error("smoothing states are not finite"));
        }

        self.params = Some(params);
        self.n = values.len();
        self.pass = Some(pass);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let pass = self.pass.as_ref().ok_or(PlannerError::Internal(
            "Holt-Winters must be fitted before prediction".to_string(),
        ))?;
        let period = self.seasonal_period;

        let predictions = (1..=horizon)
            .map(|h| {
                let s = pass.seasonals[(self.n + h - 1) % period];
                pass.level + h as f64 * pass.trend + s
            })
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.pass.as_ref().map(|p| p.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.pass.as_ref().map(|p| p.residuals.as_slice())
    }

    fn name(&self) -> &str {
        "ExponentialSmoothing"
    }

    fn min_observations(&self) -> usize {
        MIN_OBSERVATIONS.max(self.seasonal_period.saturating_mul(2))
    }

    fn describe_params(&self) -> String {
        format!("trend=add, seasonal=add, seasonal_period={}", self.seasonal_period)
    }
}
