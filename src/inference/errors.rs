//! Error type for post-estimation inference.
//!
//! `InferenceError` covers plug-in bandwidth failures and malformed score
//! matrices. The AR(1) fits behind the plug-in bandwidth come from the
//! `arima` crate, whose `anyhow` errors are folded in through `From`.

/// Unified error type for inference routines.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Bandwidth selection ----
    /// Stationarity is violated in an AR(1) process.
    StationarityViolated { phi: f64 },
    /// Denominator is too close to zero in bandwidth calculation.
    DenominatorTooSmall { denominator: f64 },
    /// Order not supported for bandwidth calculation.
    OrderNotSupported { ord: usize },

    // ---- Scores ----
    /// Score matrix needs at least two rows and one column.
    InsufficientScores { rows: usize, cols: usize },
    /// Score matrix contains a non-finite entry.
    NonFiniteScore { row: usize, col: usize },

    // ---- Anyhow catchall ----
    Anyhow(String),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        InferenceError::Anyhow(err.to_string())
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Bandwidth selection ----
            InferenceError::StationarityViolated { phi } => {
                write!(f, "Inference Error: Stationarity violated (phi = {})", phi)
            }
            InferenceError::DenominatorTooSmall { denominator } => write!(
                f,
                "Inference Error: Denominator too small ({}) in bandwidth calculation",
                denominator
            ),
            InferenceError::OrderNotSupported { ord } => {
                write!(f, "Inference Error: Order {} not supported for bandwidth calculation", ord)
            }

            // ---- Scores ----
            InferenceError::InsufficientScores { rows, cols } => {
                write!(f, "Inference Error: score matrix is {rows}x{cols}, need at least 2x1")
            }
            InferenceError::NonFiniteScore { row, col } => {
                write!(f, "Inference Error: non-finite score at ({row}, {col})")
            }

            // ---- Anyhow catchall ----
            InferenceError::Anyhow(msg) => write!(f, "Inference Error: {}", msg),
        }
    }
}
