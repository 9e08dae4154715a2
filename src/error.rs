//! Error types for the demand-planner library.

use thiserror::Error;

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Errors that can occur while forecasting demand or optimizing inventory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// No source data is loaded at all.
    #[error("inventory data is currently unavailable")]
    DataUnavailable,

    /// The product does not exist in the dataset.
    #[error("product '{0}' not found in dataset")]
    ProductNotFound(String),

    /// The product exists but has no usable sales observations.
    #[error("product '{0}' has no valid units-sold data")]
    NoData(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Dates are out of order or not contiguous.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Numerical fitting failed for a model.
    #[error("could not fit {model} model ({params}): {reason}")]
    ModelFitFailure {
        model: String,
        params: String,
        reason: String,
    },

    /// Unexpected internal fault.
    #[error("internal error: {0}")]
    Internal(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PlannerError {
    /// Build a fit failure for the given model.
    pub fn fit_failure(
        model: impl Into<String>,
        params: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ModelFitFailure {
            model: model.into(),
            params: params.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by
    /// the data source or a numerical fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound(_)
                | Self::NoData(_)
                | Self::InvalidParameter(_)
                | Self::InsufficientData { .. }
                | Self::TimestampError(_)
                | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = PlannerError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = PlannerError::ProductNotFound("P0001".to_string());
        assert_eq!(err.to_string(), "product 'P0001' not found in dataset");

        let err = PlannerError::fit_failure("ARIMA", "order=(5, 1, 0)", "did not converge");
        assert_eq!(
            err.to_string(),
            "could not fit ARIMA model (order=(5, 1, 0)): did not converge"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(PlannerError::InvalidParameter("x".into()).is_client_error());
        assert!(PlannerError::NoData("P1".into()).is_client_error());
        assert!(!PlannerError::DataUnavailable.is_client_error());
        assert!(!PlannerError::Internal("boom".into()).is_client_error());
        assert!(!PlannerError::fit_failure("ARIMA", "", "nan").is_client_error());
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = PlannerError::DataUnavailable;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
