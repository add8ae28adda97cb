//! statistical_tests::ljung_box — portmanteau test for residual autocorrelation.
//!
//! `Q = n (n + 2) Σ_{k=1..m} ρ̂_k² / (n − k)` with the biased sample
//! autocorrelations `ρ̂_k = γ̂_k / γ̂_0` of the demeaned series, referred to
//! χ²(m − model_df). `model_df` lets callers subtract the ARMA parameters
//! estimated on the series under test.
use crate::statistical_tests::{
    distributions::chi2_sf,
    errors::{TestError, TestResult},
    outcome::TestOutcome,
    validation::{validate_lags, validate_series},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LjungBoxOutcome {
    stat: f64,
    p_value: f64,
    lags: usize,
    dof: usize,
    acf: Vec<f64>,
}

impl LjungBoxOutcome {
    /// Run the Ljung–Box test up to lag `lags`.
    ///
    /// Errors
    /// ------
    /// - `TestError::InsufficientData` / `InvalidData` for short or
    ///   non-finite input; `InvalidLags` unless `1 ≤ lags < n`.
    /// - `TestError::InvalidDof` when `model_df ≥ lags`.
    /// - `TestError::ConstantSeries` when the series has zero variance.
    pub fn ljung_box(data: &[f64], lags: usize, model_df: usize) -> TestResult<Self> {
        validate_series(data, 2)?;
        validate_lags(data.len(), lags)?;
        if model_df >= lags {
            return Err(TestError::InvalidDof { lags, model_df });
        }
        let acf = autocorrelations(data, lags)?;
        let n = data.len() as f64;
        let stat = n
            * (n + 2.0)
            * acf.iter().enumerate().map(|(i, r)| r * r / (n - (i + 1) as f64)).sum::<f64>();
        let dof = lags - model_df;

        Ok(LjungBoxOutcome { stat, p_value: chi2_sf(stat, dof as f64)?, lags, dof, acf })
    }

    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    /// `ρ̂_1..ρ̂_m`.
    pub fn acf(&self) -> &[f64] {
        &self.acf
    }
}

impl TestOutcome for LjungBoxOutcome {
    fn statistic(&self) -> f64 {
        self.stat
    }

    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Biased sample autocorrelations `ρ̂_1..ρ̂_lags` of the demeaned series.
pub fn autocorrelations(data: &[f64], lags: usize) -> TestResult<Vec<f64>> {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let centered: Vec<f64> = data.iter().map(|v| v - mean).collect();
    let gamma0: f64 = centered.iter().map(|v| v * v).sum();
    if gamma0 <= 0.0 {
        return Err(TestError::ConstantSeries);
    }
    Ok((1..=lags)
        .map(|k| centered[k..].iter().zip(&centered).map(|(a, b)| a * b).sum::<f64>() / gamma0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover a hand-computed statistic, behavior on white noise
    // versus an AR(1), and the degrees-of-freedom guards.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Match a hand computation at lag 1.
    //
    // Given
    // -----
    // - x = (1, −1, 1, −1), mean 0, ρ̂_1 = −3/4.
    //
    // Expect
    // ------
    // - Q = 4·6·(9/16)/3 = 4.5.
    fn ljung_box_matches_hand_computation() {
        let outcome = LjungBoxOutcome::ljung_box(&[1.0, -1.0, 1.0, -1.0], 1, 0).unwrap();

        assert_relative_eq!(outcome.acf()[0], -0.75, epsilon = 1e-12);
        assert_relative_eq!(outcome.statistic(), 4.5, epsilon = 1e-12);
        assert_eq!(outcome.dof(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Strong autocorrelation is detected; white noise is not flagged.
    //
    // Given
    // -----
    // - 1000 seeded N(0,1) draws and an AR(1) with φ = 0.6 driven by them.
    //
    // Expect
    // ------
    // - AR(1) rejects at 1%; white noise keeps p > 0.001.
    fn ljung_box_detects_ar1() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(42);
        let noise: Vec<f64> = (0..1000).map(|_| StandardNormal.sample(&mut rng)).collect();
        let mut ar = vec![0.0; 1000];
        for t in 1..1000 {
            ar[t] = 0.6 * ar[t - 1] + noise[t];
        }

        // Act
        let wn = LjungBoxOutcome::ljung_box(&noise, 10, 0).unwrap();
        let ar1 = LjungBoxOutcome::ljung_box(&ar, 10, 0).unwrap();

        // Assert
        assert!(ar1.rejects_null(0.01));
        assert!(wn.p_value() > 0.001);
    }

    #[test]
    // Purpose
    // -------
    // Degrees-of-freedom and variance guards.
    //
    // Given
    // -----
    // - model_df = lags; a constant series.
    //
    // Expect
    // ------
    // - `InvalidDof` and `ConstantSeries`.
    fn ljung_box_rejects_bad_dof_and_constant_series() {
        let data = [0.1, 0.3, -0.2, 0.5, 0.0];

        assert_eq!(
            LjungBoxOutcome::ljung_box(&data, 2, 2),
            Err(TestError::InvalidDof { lags: 2, model_df: 2 })
        );
        assert_eq!(LjungBoxOutcome::ljung_box(&[1.0; 5], 2, 0), Err(TestError::ConstantSeries));
    }
}
