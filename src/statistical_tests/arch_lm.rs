//! statistical_tests::arch_lm — Engle's Lagrange-multiplier test for ARCH.
//!
//! Purpose
//! -------
//! Detect conditional heteroskedasticity in mean-model residuals by
//! regressing `e_t²` on a constant and `e²_{t−1..t−m}`.
//!
//! Key behaviors
//! -------------
//! - `LM = n_eff · R²` referred to χ²(m), with `n_eff = n − m`.
//! - The regression F statistic
//!   `(R²/m) / ((1 − R²)/(n_eff − m − 1))` referred to F(m, n_eff − m − 1)
//!   is reported alongside.
//!
//! Invariants & assumptions
//! ------------------------
//! - Residuals are used as given (no demeaning), matching the usual
//!   application to zero-mean model residuals.
use crate::statistical_tests::{
    distributions::{chi2_sf, f_sf},
    errors::{TestError, TestResult},
    ols::OlsFit,
    outcome::TestOutcome,
    validation::{validate_lags, validate_series},
};
use ndarray::Array2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArchLmOutcome {
    lm_stat: f64,
    lm_p_value: f64,
    f_stat: f64,
    f_p_value: f64,
    lags: usize,
    nobs: usize,
}

impl ArchLmOutcome {
    /// Run the ARCH-LM test with `lags` lagged squared residuals.
    ///
    /// Errors
    /// ------
    /// - Validation errors for short or non-finite input and invalid lags;
    ///   `InsufficientData` when fewer than `2m + 2` observations remain.
    /// - `TestError::SingularDesign` for degenerate squared residuals.
    pub fn arch_lm(resid: &[f64], lags: usize) -> TestResult<Self> {
        validate_series(resid, 2)?;
        validate_lags(resid.len(), lags)?;
        let n_eff = resid.len() - lags;
        if n_eff < lags + 2 {
            return Err(TestError::InsufficientData { needed: 2 * lags + 2, found: resid.len() });
        }

        let sq: Vec<f64> = resid.iter().map(|e| e * e).collect();
        let y = &sq[lags..];
        let x = Array2::from_shape_fn((n_eff, lags + 1), |(r, j)| {
            if j == 0 { 1.0 } else { sq[lags + r - j] }
        });
        let fit = OlsFit::fit(y, &x)?;
        let r2 = fit.r_squared.clamp(0.0, 1.0);

        let lm_stat = n_eff as f64 * r2;
        let df_denom = (n_eff - lags - 1) as f64;
        let f_stat = if r2 < 1.0 { (r2 / lags as f64) / ((1.0 - r2) / df_denom) } else { f64::INFINITY };

        Ok(ArchLmOutcome {
            lm_stat,
            lm_p_value: chi2_sf(lm_stat, lags as f64)?,
            f_stat,
            f_p_value: f_sf(f_stat, lags as f64, df_denom)?,
            lags,
            nobs: n_eff,
        })
    }

    pub fn f_stat(&self) -> f64 {
        self.f_stat
    }

    pub fn f_p_value(&self) -> f64 {
        self.f_p_value
    }

    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn nobs(&self) -> usize {
        self.nobs
    }
}

impl TestOutcome for ArchLmOutcome {
    fn statistic(&self) -> f64 {
        self.lm_stat
    }

    fn p_value(&self) -> f64 {
        self.lm_p_value
    }
}
