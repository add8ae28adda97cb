//! statistical_tests::validation — shared input guards for test statistics.
//!
//! Purpose
//! -------
//! Centralize the checks every diagnostic runs before touching lags:
//! series length, finiteness, and lag bounds. Keeping them here gives all
//! tests identical error semantics.
//!
//! Conventions
//! -----------
//! - Pure validation; no allocation beyond error construction.
//! - Model-specific checks (e.g. Ljung–Box degrees of freedom) stay in the
//!   test modules.

use crate::statistical_tests::errors::{TestError, TestResult};

/// Validate that `data` has at least `min_len` finite observations.
///
/// Errors
/// ------
/// - `TestError::InsufficientData` when `data.len() < min_len`.
/// - `TestError::InvalidData` at the first non-finite entry.
///
/// Examples
/// --------
/// ```rust
/// # use rust_volatility::statistical_tests::validation::validate_series;
/// # use rust_volatility::statistical_tests::errors::TestError;
/// let data = vec![0.1_f64, -0.2, 0.3];
/// assert!(validate_series(&data, 3).is_ok());
///
/// match validate_series(&data, 4) {
///     Err(TestError::InsufficientData { needed: 4, found: 3 }) => (),
///     other => panic!("expected InsufficientData, got {other:?}"),
/// }
/// ```
pub fn validate_series(data: &[f64], min_len: usize) -> TestResult<()> {
    if data.len() < min_len {
        return Err(TestError::InsufficientData { needed: min_len, found: data.len() });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(TestError::InvalidData { index, value });
    }
    Ok(())
}

/// Validate a lag count against the sample size: `1 ≤ lags < n`.
///
/// Errors
/// ------
/// - `TestError::InvalidLags(lags)` otherwise.
pub fn validate_lags(n: usize, lags: usize) -> TestResult<()> {
    if lags == 0 || lags >= n {
        return Err(TestError::InvalidLags(lags));
    }
    Ok(())
}
