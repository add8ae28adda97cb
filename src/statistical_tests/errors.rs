//! statistical_tests::errors — error type for diagnostic tests.
//!
//! Purpose
//! -------
//! One error enum for every diagnostic in this subtree (ADF, Ljung–Box,
//! ARCH-LM, sign bias) and the OLS helper they share, so callers can
//! propagate failures with `?` and match on a single type.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the violated constraint
//!   ("need at least 12 observations", "lags must be positive") and embed
//!   the offending value.
//! - Variants carry scalars only; they are cheap to clone and compare in
//!   tests.

pub type TestResult<T> = Result<T, TestError>;

/// TestError — validation and computation failures of diagnostic tests.
///
/// Variants
/// --------
/// - `InsufficientData { needed, found }`
///   The series is too short for the requested lags / regression.
/// - `InvalidData { index, value }`
///   A non-finite observation at `index`.
/// - `InvalidLags(lags)`
///   A lag count of zero, or one that leaves no usable sample.
/// - `InvalidDof { lags, model_df }`
///   Ljung–Box model degrees of freedom consume all lags.
/// - `ConstantSeries`
///   Zero sample variance where a ratio by the variance is needed.
/// - `SingularDesign { rank, cols }`
///   OLS design matrix does not have full column rank.
/// - `Distribution(String)`
///   A reference distribution could not be constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum TestError {
    // ---- Input validation ----
    InsufficientData { needed: usize, found: usize },
    InvalidData { index: usize, value: f64 },
    InvalidLags(usize),
    InvalidDof { lags: usize, model_df: usize },
    ConstantSeries,

    // ---- Regression ----
    SingularDesign { rank: usize, cols: usize },

    // ---- Reference distributions ----
    Distribution(String),
}

impl std::error::Error for TestError {}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input validation ----
            TestError::InsufficientData { needed, found } => {
                write!(f, "Need at least {needed} observations, found {found}.")
            }
            TestError::InvalidData { index, value } => {
                write!(f, "Invalid data value {value} at index {index}. Must be a finite number.")
            }
            TestError::InvalidLags(lags) => {
                write!(f, "Invalid lag count {lags}. Must be positive and smaller than the sample.")
            }
            TestError::InvalidDof { lags, model_df } => write!(
                f,
                "Model degrees of freedom ({model_df}) must be smaller than the number of lags ({lags})."
            ),
            TestError::ConstantSeries => write!(f, "Series has zero variance."),

            // ---- Regression ----
            TestError::SingularDesign { rank, cols } => {
                write!(f, "Regression design is rank deficient (rank {rank} < {cols} columns).")
            }

            // ---- Reference distributions ----
            TestError::Distribution(msg) => write!(f, "Reference distribution error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover `Display` payload embedding for the variants with
    // data. Construction paths are exercised in the test modules.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `InsufficientData` reports both the requirement and what was found.
    //
    // Given
    // -----
    // - needed = 12, found = 5.
    //
    // Expect
    // ------
    // - The message contains "12" and "5".
    fn test_error_insufficient_data_includes_counts() {
        // Arrange
        let err = TestError::InsufficientData { needed: 12, found: 5 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("12") && msg.contains('5'), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // `InvalidData` embeds index and value.
    //
    // Given
    // -----
    // - index = 7, value = NaN.
    //
    // Expect
    // ------
    // - The message contains "7" and "NaN".
    fn test_error_invalid_data_includes_payload() {
        let msg = TestError::InvalidData { index: 7, value: f64::NAN }.to_string();

        assert!(msg.contains('7') && msg.contains("NaN"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // `SingularDesign` reports rank and column count.
    //
    // Given
    // -----
    // - rank = 2, cols = 3.
    //
    // Expect
    // ------
    // - Both numbers appear.
    fn test_error_singular_design_includes_rank() {
        let msg = TestError::SingularDesign { rank: 2, cols: 3 }.to_string();

        assert!(msg.contains("rank 2") && msg.contains("3 columns"), "Got: {msg}");
    }
}
