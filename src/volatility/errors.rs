//! Errors for GARCH-family specification, estimation, forecasting and
//! simulation.
use crate::{inference::errors::InferenceError, optimization::errors::OptError};

pub type GarchResult<T> = Result<T, GarchError>;

#[derive(Debug, Clone, PartialEq)]
pub enum GarchError {
    // ---- Specification ----
    /// Variance orders outside the supported range.
    InvalidOrder { p: usize, o: usize, q: usize, reason: &'static str },
    /// AR mean order outside `1..=MAX_AR_MEAN`.
    InvalidMeanOrder { k: usize },

    // ---- Parameters ----
    /// Parameter vector does not match the specification.
    ParamLength { expected: usize, actual: usize },
    /// A model-space parameter violates its constraint.
    InvalidParameter { name: String, value: f64, reason: &'static str },

    // ---- Input data ----
    InsufficientData { needed: usize, found: usize },
    InvalidData { index: usize, value: f64 },

    // ---- Forecasting / simulation ----
    InvalidHorizon { horizon: usize },
    InvalidLevel { level: f64 },
    /// Quantile of the innovation distribution could not be computed.
    Distribution(String),

    // ---- Wrapped ----
    Optimization(OptError),
    Inference(InferenceError),
}

impl std::error::Error for GarchError {}

impl std::fmt::Display for GarchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Specification ----
            GarchError::InvalidOrder { p, o, q, reason } => {
                write!(f, "Invalid variance order (p={p}, o={o}, q={q}): {reason}")
            }
            GarchError::InvalidMeanOrder { k } => write!(f, "Invalid AR mean order {k}"),

            // ---- Parameters ----
            GarchError::ParamLength { expected, actual } => {
                write!(f, "Expected {expected} parameters, got {actual}")
            }
            GarchError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid parameter {name} = {value}: {reason}")
            }

            // ---- Input data ----
            GarchError::InsufficientData { needed, found } => {
                write!(f, "Variance model needs at least {needed} observations, found {found}")
            }
            GarchError::InvalidData { index, value } => {
                write!(f, "Invalid return {value} at index {index}; must be finite")
            }

            // ---- Forecasting / simulation ----
            GarchError::InvalidHorizon { horizon } => {
                write!(f, "Horizon must be positive, got {horizon}")
            }
            GarchError::InvalidLevel { level } => {
                write!(f, "Level must lie in (0, 1), got {level}")
            }
            GarchError::Distribution(msg) => write!(f, "Innovation distribution error: {msg}"),

            // ---- Wrapped ----
            GarchError::Optimization(err) => write!(f, "Variance model estimation failed: {err}"),
            GarchError::Inference(err) => write!(f, "{err}"),
        }
    }
}

impl From<OptError> for GarchError {
    fn from(err: OptError) -> Self {
        GarchError::Optimization(err)
    }
}

impl From<InferenceError> for GarchError {
    fn from(err: InferenceError) -> Self {
        GarchError::Inference(err)
    }
}
