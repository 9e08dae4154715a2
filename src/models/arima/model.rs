//! ARIMA (Autoregressive Integrated Moving Average) model.

use crate::core::{DailySeries, Forecast};
use crate::error::{PlannerError, Result};
use crate::models::arima::diff::{difference, integrate};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, yule_walker};
use std::f64::consts::PI;

/// Fewest observations any ARIMA fit accepts.
pub const MIN_OBSERVATIONS: usize = 10;

const COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ARIMASpec {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Undifferenced models carry a mean term; differenced ones do not.
    pub fn has_intercept(&self) -> bool {
        self.d == 0
    }

    /// Number of estimated coefficients (excluding the noise variance).
    pub fn num_params(&self) -> usize {
        self.p + self.q + usize::from(self.has_intercept())
    }
}

impl Default for ARIMASpec {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

/// Coefficients unpacked from the optimiser's flat parameter vector.
struct Coefficients<'a> {
    intercept: f64,
    ar: &'a [f64],
    ma: &'a [f64],
}

/// ARIMA forecasting model fitted by conditional maximum likelihood.
///
/// With Gaussian innovations and the noise variance concentrated out, the
/// conditional log-likelihood is maximised exactly where the conditional sum
/// of squares (CSS) is minimised, so fitting minimises the CSS with a bounded
/// Nelder-Mead simplex started from Yule-Walker estimates.
#[derive(Debug, Clone)]
pub struct ARIMA {
    spec: ARIMASpec,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    intercept: f64,
    /// Original series (for integration).
    original: Option<Vec<f64>>,
    differenced: Option<Vec<f64>>,
    /// Fitted values on the differenced scale.
    fitted_diff: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    sigma2: Option<f64>,
    log_likelihood: Option<f64>,
    iterations: usize,
}

impl ARIMA {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            spec: ARIMASpec::new(p, d, q),
            ar_coefficients: vec![],
            ma_coefficients: vec![],
            intercept: 0.0,
            original: None,
            differenced: None,
            fitted_diff: None,
            residuals: None,
            sigma2: None,
            log_likelihood: None,
            iterations: 0,
        }
    }

    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> Option<f64> {
        self.sigma2
    }

    /// Maximised conditional log-likelihood. `None` for a perfect fit, where
    /// the likelihood is unbounded.
    pub fn log_likelihood(&self) -> Option<f64> {
        self.log_likelihood
    }

    pub fn aic(&self) -> Option<f64> {
        let k = (self.spec.num_params() + 1) as f64;
        self.log_likelihood.map(|ll| -2.0 * ll + 2.0 * k)
    }

    pub fn bic(&self) -> Option<f64> {
        let k = (self.spec.num_params() + 1) as f64;
        let n = self.effective_observations()? as f64;
        self.log_likelihood.map(|ll| -2.0 * ll + k * n.ln())
    }

    /// Optimiser iterations used by the last fit.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn start(&self) -> usize {
        self.spec.p.max(self.spec.q)
    }

    fn effective_observations(&self) -> Option<usize> {
        self.differenced
            .as_ref()
            .map(|d| d.len().saturating_sub(self.start()))
    }

    fn unpack<'a>(&self, params: &'a [f64]) -> Coefficients<'a> {
        let offset = usize::from(self.spec.has_intercept());
        let intercept = if offset == 1 { params[0] } else { 0.0 };
        let (ar, ma) = params[offset..].split_at(self.spec.p);
        Coefficients { intercept, ar, ma }
    }

    /// One-step predictions and residuals on the differenced scale.
    fn filter(&self, diff_series: &[f64], coef: &Coefficients) -> (Vec<f64>, Vec<f64>) {
        let n = diff_series.len();
        let start = self.start();
        let mut fitted = vec![f64::NAN; n];
        let mut residuals = vec![0.0; n];

        for t in start..n {
            let mut pred = coef.intercept;
            for (i, phi) in coef.ar.iter().enumerate() {
                pred += phi * (diff_series[t - 1 - i] - coef.intercept);
            }
            for (i, theta) in coef.ma.iter().enumerate() {
                pred += theta * residuals[t - 1 - i];
            }
            fitted[t] = pred;
            residuals[t] = diff_series[t] - pred;
        }

        (fitted, residuals)
    }

    fn css(&self, diff_series: &[f64], params: &[f64]) -> f64 {
        let (_, residuals) = self.filter(diff_series, &self.unpack(params));
        residuals[self.start()..].iter().map(|e| e * e).sum()
    }

    fn initial_params(&self, diff_series: &[f64]) -> Vec<f64> {
        let mut initial = Vec::with_capacity(self.spec.num_params());
        let centred: Vec<f64> = if self.spec.has_intercept() {
            let m = mean(diff_series);
            initial.push(m);
            diff_series.iter().map(|x| x - m).collect()
        } else {
            diff_series.to_vec()
        };
        initial.extend(
            yule_walker(&centred, self.spec.p)
                .into_iter()
                .map(|c| c.clamp(-COEFFICIENT_BOUND, COEFFICIENT_BOUND)),
        );
        initial.extend(std::iter::repeat(0.0).take(self.spec.q));
        initial
    }

    fn estimate_parameters(&mut self, diff_series: &[f64]) -> Result<()> {
        let initial = self.initial_params(diff_series);
        if initial.is_empty() {
            return Ok(());
        }

        let mut bounds = Vec::with_capacity(initial.len());
        if self.spec.has_intercept() {
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        bounds.extend(
            std::iter::repeat((-COEFFICIENT_BOUND, COEFFICIENT_BOUND))
                .take(self.spec.p + self.spec.q),
        );

        let scale = self.css(diff_series, &initial);
        if !scale.is_finite() {
            return Err(self.fit_error("conditional sum of squares is not finite"));
        }
        let config = NelderMeadConfig {
            max_iter: 10_000,
            tolerance: 1e-10 * (1.0 + scale),
            ..Default::default()
        };

        let result = nelder_mead(
            |params| self.css(diff_series, params),
            &initial,
            Some(&bounds),
            config,
        );
        self.iterations = result.iterations;

        if !result.optimal_value.is_finite() {
            return Err(self.fit_error("conditional sum of squares is not finite"));
        }
        if !result.converged {
            return Err(self.fit_error(format!(
                "likelihood optimisation did not converge after {} iterations",
                result.iterations
            )));
        }

        let coef = self.unpack(&result.optimal_point);
        self.intercept = coef.intercept;
        self.ar_coefficients = coef.ar.to_vec();
        self.ma_coefficients = coef.ma.to_vec();
        Ok(())
    }

    fn calculate_fitted(&mut self, diff_series: &[f64]) {
        let mut params = Vec::with_capacity(self.spec.num_params());
        if self.spec.has_intercept() {
            params.push(self.intercept);
        }
        params.extend_from_slice(&self.ar_coefficients);
        params.extend_from_slice(&self.ma_coefficients);

        let (fitted, residuals) = self.filter(diff_series, &self.unpack(&params));
        let valid = &residuals[self.start()..];
        if !valid.is_empty() {
            let n_eff = valid.len() as f64;
            let sigma2 = valid.iter().map(|r| r * r).sum::<f64>() / n_eff;
            self.sigma2 = Some(sigma2);
            self.log_likelihood = (sigma2 > 0.0)
                .then(|| -0.5 * n_eff * ((2.0 * PI * sigma2).ln() + 1.0));
        }

        self.fitted_diff = Some(fitted);
        self.residuals = Some(residuals);
    }

    fn fit_error(&self, reason: impl Into<String>) -> PlannerError {
        PlannerError::fit_failure(self.name(), self.describe_params(), reason)
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        let spec = ARIMASpec::default();
        Self::new(spec.p, spec.d, spec.q)
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let values = series.values();
        let needed = self.min_observations();
        if values.len() < needed {
            return Err(PlannerError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let diff_series = difference(values, self.spec.d);
        self.estimate_parameters(&diff_series)?;
        self.calculate_fitted(&diff_series);
        self.original = Some(values.to_vec());
        self.differenced = Some(diff_series);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(PlannerError::Internal(
            "ARIMA must be fitted before prediction".to_string(),
        ))?;
        let diff_series = self.differenced.as_deref().unwrap_or_default();
        let residuals = self.residuals.as_deref().unwrap_or_default();

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let mut extended_diff = diff_series.to_vec();
        let mut extended_residuals = residuals.to_vec();

        for _ in 0..horizon {
            let t = extended_diff.len();
            let mut pred = self.intercept;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if t > i {
                    pred += phi * (extended_diff[t - 1 - i] - self.intercept);
                }
            }
            // Future innovations have zero expectation.
            for (i, theta) in self.ma_coefficients.iter().enumerate() {
                if t > i {
                    pred += theta * extended_residuals[t - 1 - i];
                }
            }
            extended_diff.push(pred);
            extended_residuals.push(0.0);
        }

        let forecast_diff = &extended_diff[diff_series.len()..];
        let predictions = if self.spec.d > 0 {
            integrate(forecast_diff, original, self.spec.d)
        } else {
            forecast_diff.to_vec()
        };

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted_diff.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "ARIMA"
    }

    fn min_observations(&self) -> usize {
        MIN_OBSERVATIONS.max(self.spec.d + self.start() + 2)
    }

    fn describe_params(&self) -> String {
        format!("order=({}, {}, {})", self.spec.p, self.spec.d, self.spec.q)
    }
}
