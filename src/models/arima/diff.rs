//! Differencing and integration for the "I" in ARIMA.

/// Difference a series `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// Each level is re-accumulated starting from the last observed value of the
/// corresponding intermediate difference of `original`.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .scan(anchor, |acc, step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_difference() {
        assert_eq!(
            difference(&[1.0, 3.0, 6.0, 10.0, 15.0], 1),
            vec![2.0, 3.0, 4.0, 5.0]
        );
    }

    #[test]
    fn second_difference() {
        assert_eq!(difference(&[1.0, 3.0, 6.0, 10.0, 15.0], 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn zero_order_and_empty_are_identity() {
        assert_eq!(difference(&[4.0, 2.0], 0), vec![4.0, 2.0]);
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn integrate_continues_from_last_value() {
        let original = [10.0, 12.0, 15.0, 19.0, 24.0];
        let integrated = integrate(&[6.0, 7.0], &original, 1);
        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn integrate_second_order() {
        // Second differences of a quadratic are constant.
        let original = [1.0, 3.0, 6.0, 10.0, 15.0];
        let integrated = integrate(&[1.0, 1.0], &original, 2);
        assert_relative_eq!(integrated[0], 21.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 28.0, epsilon = 1e-10);
    }
}
