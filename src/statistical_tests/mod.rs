//! statistical_tests — diagnostics for unit roots, autocorrelation and
//! conditional heteroskedasticity.
//!
//! Purpose
//! -------
//! Collect the hypothesis tests the volatility analysis branches on, with
//! shared validation, error handling and OLS machinery.
//!
//! Key behaviors
//! -------------
//! - [`AdfOutcome::adf`]: augmented Dickey–Fuller with MacKinnon p-values
//!   and critical values.
//! - [`LjungBoxOutcome::ljung_box`]: portmanteau test on residual
//!   autocorrelations.
//! - [`ArchLmOutcome::arch_lm`]: Engle's ARCH-LM test (χ² and F forms).
//! - [`SignBiasOutcome::sign_bias`]: Engle–Ng sign and size bias tests.
//! - Every outcome implements [`TestOutcome`] (`statistic`, `p_value`,
//!   `rejects_null(alpha)`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite real series; entry points call
//!   [`validation::validate_series`] before any lag arithmetic and report
//!   failures through [`TestResult`] instead of panicking.
//! - p-values are asymptotic and lie in `[0, 1]`.
//!
//! Conventions
//! -----------
//! - Outcomes are small serializable value objects with accessor methods;
//!   they never own the input series.
//! - Auxiliary regressions go through [`ols::OlsFit`].
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use rust_volatility::statistical_tests::{LjungBoxOutcome, TestOutcome};
//!
//! let resid = vec![0.3, -0.1, 0.4, -0.5, 0.2, 0.1, -0.3, 0.6, -0.2, 0.05];
//! let lb = LjungBoxOutcome::ljung_box(&resid, 3, 0).unwrap();
//! let autocorrelated = lb.rejects_null(0.05);
//! # let _ = autocorrelated;
//! ```
//!
//! Testing notes
//! -------------
//! - Each module tests hand-computed statistics on tiny inputs and
//!   detection / non-detection on seeded simulations.

pub mod adf;
pub mod arch_lm;
pub mod distributions;
pub mod errors;
pub mod ljung_box;
pub mod ols;
pub mod outcome;
pub mod sign_bias;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adf::{AdfLag, AdfOutcome, AdfRegression, CriticalValues};
pub use self::arch_lm::ArchLmOutcome;
pub use self::errors::{TestError, TestResult};
pub use self::ljung_box::LjungBoxOutcome;
pub use self::outcome::TestOutcome;
pub use self::sign_bias::{CoefTest, SignBiasOutcome};

pub mod prelude {
    pub use super::adf::{AdfLag, AdfOutcome, AdfRegression};
    pub use super::arch_lm::ArchLmOutcome;
    pub use super::errors::{TestError, TestResult};
    pub use super::ljung_box::LjungBoxOutcome;
    pub use super::outcome::TestOutcome;
    pub use super::sign_bias::SignBiasOutcome;
}
