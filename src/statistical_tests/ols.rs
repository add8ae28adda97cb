//! statistical_tests::ols — ordinary least squares for auxiliary regressions.
//!
//! Purpose
//! -------
//! Small dense OLS solver behind the ADF, ARCH-LM and sign-bias
//! regressions. Designs are at most a few dozen columns, so the normal
//! equations are solved by Cholesky after an SVD rank check.
//!
//! Key behaviors
//! -------------
//! - [`OlsFit::fit`] returns coefficients, classical standard errors,
//!   t-statistics, residuals, SSR, centered R² and the Gaussian
//!   log-likelihood with its AIC.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x` is `n × k` with `n > k` and full column rank; otherwise
//!   `TestError::SingularDesign` / `InsufficientData`.
//! - R² is centered around the mean of `y`, matching regressions that carry
//!   an intercept column.
use crate::statistical_tests::errors::{TestError, TestResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

const RANK_TOL: f64 = 1e-10;

/// Result of an OLS regression `y = X b + e`.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub params: Array1<f64>,
    pub std_errors: Array1<f64>,
    pub resid: Array1<f64>,
    pub ssr: f64,
    pub r_squared: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// Fit `y` on the columns of `x`.
    ///
    /// Errors
    /// ------
    /// - `TestError::InsufficientData` when `n ≤ k`.
    /// - `TestError::SingularDesign` when `rank(X) < k`.
    pub fn fit(y: &[f64], x: &Array2<f64>) -> TestResult<Self> {
        let (n, k) = x.dim();
        if y.len() != n || n <= k {
            return Err(TestError::InsufficientData { needed: k + 1, found: y.len().min(n) });
        }
        let x_mat = DMatrix::from_fn(n, k, |i, j| x[[i, j]]);
        let y_vec = DVector::from_column_slice(y);

        let rank = x_mat.rank(RANK_TOL);
        if rank < k {
            return Err(TestError::SingularDesign { rank, cols: k });
        }
        let xtx = x_mat.tr_mul(&x_mat);
        let chol = xtx.cholesky().ok_or(TestError::SingularDesign { rank, cols: k })?;
        let beta = chol.solve(&x_mat.tr_mul(&y_vec));
        let xtx_inv = chol.inverse();

        let fitted = &x_mat * &beta;
        let resid: Array1<f64> = (0..n).map(|i| y[i] - fitted[i]).collect();
        let ssr = resid.dot(&resid);
        let sigma2 = ssr / (n - k) as f64;

        let y_mean = y.iter().sum::<f64>() / n as f64;
        let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
        let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { 0.0 };

        Ok(OlsFit {
            params: beta.iter().copied().collect(),
            std_errors: (0..k).map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt()).collect(),
            resid,
            ssr,
            r_squared,
            nobs: n,
        })
    }

    /// Number of regressors.
    pub fn k(&self) -> usize {
        self.params.len()
    }

    /// Residual degrees of freedom `n − k`.
    pub fn df_resid(&self) -> usize {
        self.nobs - self.k()
    }

    /// `b_j / se_j`.
    pub fn t_values(&self) -> Array1<f64> {
        &self.params / &self.std_errors
    }

    /// Gaussian log-likelihood with the ML variance `SSR / n`.
    pub fn loglik(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// `−2ℓ + 2k`.
    pub fn aic(&self) -> f64 {
        -2.0 * self.loglik() + 2.0 * self.k() as f64
    }
}

/// Design matrix builder: stacks columns of equal length.
pub fn design_from_columns(columns: &[Vec<f64>]) -> Array2<f64> {
    let n = columns.first().map_or(0, Vec::len);
    Array2::from_shape_fn((n, columns.len()), |(i, j)| columns[j][i])
}
