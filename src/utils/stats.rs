//! Statistical utility functions.

use crate::error::{PlannerError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Inverse of the standard normal CDF.
///
/// Returns `-inf` at 0 and `+inf` at 1; probabilities outside `[0, 1]` are
/// rejected.
///
/// # Example
/// ```
/// use demand_planner::utils::stats::z_score;
///
/// let z = z_score(0.95).unwrap();
/// assert!((z - 1.6449).abs() < 1e-3);
/// ```
pub fn z_score(probability: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(PlannerError::InvalidParameter(format!(
            "probability must be within [0, 1], got {probability}"
        )));
    }
    if probability == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if probability == 1.0 {
        return Ok(f64::INFINITY);
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| PlannerError::Internal(e.to_string()))?;
    Ok(normal.inverse_cdf(probability))
}

/// Mean of a slice; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n-1 denominator); NaN for fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Sample standard deviation; NaN for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Yule-Walker AR(`p`) coefficients via the Durbin-Levinson recursion.
///
/// Returns all zeros when the series has no variance or the recursion
/// becomes singular; the result is then still a valid (stationary) start
/// for likelihood optimisation.
pub fn yule_walker(series: &[f64], p: usize) -> Vec<f64> {
    let n = series.len();
    if p == 0 || n <= p {
        return vec![0.0; p];
    }

    let m = mean(series);
    let autocov: Vec<f64> = (0..=p)
        .map(|lag| {
            series[lag..]
                .iter()
                .zip(series)
                .map(|(a, b)| (a - m) * (b - m))
                .sum::<f64>()
                / n as f64
        })
        .collect();
    if autocov[0] < 1e-12 {
        return vec![0.0; p];
    }
    let acf: Vec<f64> = autocov.iter().map(|c| c / autocov[0]).collect();

    let mut phi = vec![0.0; p];
    let mut error: f64 = 1.0;
    for k in 0..p {
        let num = acf[k + 1] - (0..k).map(|j| phi[j] * acf[k - j]).sum::<f64>();
        if error.abs() < 1e-12 {
            return vec![0.0; p];
        }
        let reflection = num / error;
        let previous = phi.clone();
        phi[k] = reflection;
        for j in 0..k {
            phi[j] = previous[j] - reflection * previous[k - 1 - j];
        }
        error *= 1.0 - reflection * reflection;
    }

    if phi.iter().all(|c| c.is_finite()) {
        phi
    } else {
        vec![0.0; p]
    }
}
