//! Errors for ARIMA specification, fitting, order selection and forecasting.
//!
//! Optimizer and diagnostic failures keep their own types inside
//! [`ArimaError::Optimization`] and [`ArimaError::Test`] so callers can still
//! match on the underlying cause.
use crate::{optimization::errors::OptError, statistical_tests::errors::TestError};

pub type ArimaResult<T> = Result<T, ArimaError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ArimaError {
    // ---- Specification ----
    /// Orders outside the supported range.
    InvalidOrder { p: usize, d: usize, q: usize, reason: &'static str },

    // ---- Input data ----
    /// Too few observations after differencing and conditioning.
    InsufficientData { needed: usize, found: usize },
    /// A non-finite observation.
    InvalidData { index: usize, value: f64 },

    // ---- Forecasting ----
    /// Horizon must be at least one step.
    InvalidHorizon { horizon: usize },
    /// Interval coverage must lie strictly inside (0, 1).
    InvalidLevel { level: f64 },

    // ---- Order selection ----
    /// Every candidate order failed to fit.
    NoValidCandidate { tried: usize },

    // ---- Wrapped ----
    Optimization(OptError),
    Test(TestError),
}

impl std::error::Error for ArimaError {}

impl std::fmt::Display for ArimaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Specification ----
            ArimaError::InvalidOrder { p, d, q, reason } => {
                write!(f, "Invalid ARIMA({p},{d},{q}) order: {reason}")
            }

            // ---- Input data ----
            ArimaError::InsufficientData { needed, found } => write!(
                f,
                "ARIMA needs at least {needed} usable observations, found {found}"
            ),
            ArimaError::InvalidData { index, value } => {
                write!(f, "Invalid observation {value} at index {index}; must be finite")
            }

            // ---- Forecasting ----
            ArimaError::InvalidHorizon { horizon } => {
                write!(f, "Forecast horizon must be positive, got {horizon}")
            }
            ArimaError::InvalidLevel { level } => {
                write!(f, "Interval level must lie in (0, 1), got {level}")
            }

            // ---- Order selection ----
            ArimaError::NoValidCandidate { tried } => {
                write!(f, "None of the {tried} candidate ARIMA orders could be fitted")
            }

            // ---- Wrapped ----
            ArimaError::Optimization(err) => write!(f, "ARIMA estimation failed: {err}"),
            ArimaError::Test(err) => write!(f, "ARIMA order selection failed: {err}"),
        }
    }
}

impl From<OptError> for ArimaError {
    fn from(err: OptError) -> Self {
        ArimaError::Optimization(err)
    }
}

impl From<TestError> for ArimaError {
    fn from(err: TestError) -> Self {
        ArimaError::Test(err)
    }
}
