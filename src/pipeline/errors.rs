//! Top-level error of the analysis pipeline.
//!
//! Every subsystem error converts into [`PipelineError`] through `From`, so
//! stage code propagates with `?` and the binary reports one message.
use crate::{
    comparison::ComparisonError, data::errors::DataError, mean_model::errors::ArimaError,
    statistical_tests::errors::TestError, volatility::errors::GarchError,
};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    // ---- Configuration ----
    InvalidConfig { field: &'static str, reason: String },

    // ---- Methodology ----
    /// Log-returns kept a unit root; no variance model may be fitted.
    ReturnsNotStationary { stat: f64, p_value: f64, alpha: f64 },

    // ---- Output ----
    /// The JSON report could not be written.
    Report(String),

    // ---- Wrapped ----
    Data(DataError),
    Test(TestError),
    Arima(ArimaError),
    Garch(GarchError),
    Comparison(ComparisonError),
}

impl std::error::Error for PipelineError {}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            PipelineError::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration for '{field}': {reason}")
            }

            // ---- Methodology ----
            PipelineError::ReturnsNotStationary { stat, p_value, alpha } => write!(
                f,
                "Log-returns are not stationary (ADF stat = {stat:.4}, p = {p_value:.4} >= {alpha}); refusing to fit a variance model"
            ),

            // ---- Output ----
            PipelineError::Report(msg) => write!(f, "Could not write report: {msg}"),

            // ---- Wrapped ----
            PipelineError::Data(err) => write!(f, "{err}"),
            PipelineError::Test(err) => write!(f, "Diagnostic test failed: {err}"),
            PipelineError::Arima(err) => write!(f, "{err}"),
            PipelineError::Garch(err) => write!(f, "{err}"),
            PipelineError::Comparison(err) => write!(f, "Model comparison failed: {err}"),
        }
    }
}

impl From<DataError> for PipelineError {
    fn from(err: DataError) -> Self {
        PipelineError::Data(err)
    }
}

impl From<TestError> for PipelineError {
    fn from(err: TestError) -> Self {
        PipelineError::Test(err)
    }
}

impl From<ArimaError> for PipelineError {
    fn from(err: ArimaError) -> Self {
        PipelineError::Arima(err)
    }
}

impl From<GarchError> for PipelineError {
    fn from(err: GarchError) -> Self {
        PipelineError::Garch(err)
    }
}

impl From<ComparisonError> for PipelineError {
    fn from(err: ComparisonError) -> Self {
        PipelineError::Comparison(err)
    }
}
