//! statistical_tests::sign_bias — Engle–Ng (1993) asymmetry diagnostics.
//!
//! Purpose
//! -------
//! Decide whether a symmetric variance model leaves a leverage effect in
//! its standardized residuals `z_t`.
//!
//! Key behaviors
//! -------------
//! - Regression `z_t² = b0 + b1 S⁻_{t−1} + b2 S⁻_{t−1} z_{t−1}
//!   + b3 S⁺_{t−1} z_{t−1} + u_t`, with `S⁻ = 1[z < 0]`, `S⁺ = 1 − S⁻`.
//! - Individual t-tests: sign bias (`b1`), negative size bias (`b2`),
//!   positive size bias (`b3`), two-sided against t(n_eff − 4).
//! - Joint test `n_eff · R²` against χ²(3); this is the outcome's headline
//!   statistic.
use crate::statistical_tests::{
    distributions::{chi2_sf, t_two_sided},
    errors::TestResult,
    ols::OlsFit,
    outcome::TestOutcome,
    validation::validate_series,
};
use ndarray::Array2;
use serde::Serialize;

/// t-statistic and two-sided p-value of one regression coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefTest {
    pub coef: f64,
    pub t_stat: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignBiasOutcome {
    sign_bias: CoefTest,
    negative_size_bias: CoefTest,
    positive_size_bias: CoefTest,
    joint_stat: f64,
    joint_p_value: f64,
}

impl SignBiasOutcome {
    /// Run the sign-bias battery on standardized residuals.
    ///
    /// Errors
    /// ------
    /// - Validation errors for fewer than 10 or non-finite observations.
    /// - `TestError::SingularDesign` when all shocks share one sign.
    pub fn sign_bias(std_resid: &[f64]) -> TestResult<Self> {
        validate_series(std_resid, 10)?;
        let n_eff = std_resid.len() - 1;

        let y: Vec<f64> = std_resid[1..].iter().map(|z| z * z).collect();
        let x = Array2::from_shape_fn((n_eff, 4), |(r, j)| {
            let lagged = std_resid[r];
            let neg = if lagged < 0.0 { 1.0 } else { 0.0 };
            match j {
                0 => 1.0,
                1 => neg,
                2 => neg * lagged,
                _ => (1.0 - neg) * lagged,
            }
        });
        let fit = OlsFit::fit(&y, &x)?;
        let t_values = fit.t_values();
        let df = fit.df_resid() as f64;
        let coef_test = |j: usize| -> TestResult<CoefTest> {
            Ok(CoefTest {
                coef: fit.params[j],
                t_stat: t_values[j],
                p_value: t_two_sided(t_values[j], df)?,
            })
        };

        let joint_stat = n_eff as f64 * fit.r_squared.clamp(0.0, 1.0);
        Ok(SignBiasOutcome {
            sign_bias: coef_test(1)?,
            negative_size_bias: coef_test(2)?,
            positive_size_bias: coef_test(3)?,
            joint_stat,
            joint_p_value: chi2_sf(joint_stat, 3.0)?,
        })
    }

    pub fn sign_bias_test(&self) -> CoefTest {
        self.sign_bias
    }

    pub fn negative_size_bias(&self) -> CoefTest {
        self.negative_size_bias
    }

    pub fn positive_size_bias(&self) -> CoefTest {
        self.positive_size_bias
    }
}

impl TestOutcome for SignBiasOutcome {
    fn statistic(&self) -> f64 {
        self.joint_stat
    }

    fn p_value(&self) -> f64 {
        self.joint_p_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_tests::errors::TestError;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover detection of a leverage effect, the quiet case on
    // i.i.d. shocks, and the one-signed degenerate input.
    // -------------------------------------------------------------------------

    fn draws(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| StandardNormal.sample(&mut rng)).collect()
    }

    #[test]
    // Purpose
    // -------
    // Variance that responds only to negative shocks is flagged.
    //
    // Given
    // -----
    // - z_t = sqrt(0.3 + 0.9·1[z_{t−1}<0]·z²_{t−1}) u_t with seeded u.
    //
    // Expect
    // ------
    // - Joint p < 1e-4 and a negative size-bias t-statistic below −2.
    fn sign_bias_detects_leverage() {
        // Arrange
        let u = draws(3000, 21);
        let mut z = vec![0.0_f64; 3000];
        z[0] = u[0];
        for t in 1..3000 {
            let neg = if z[t - 1] < 0.0 { z[t - 1] * z[t - 1] } else { 0.0 };
            z[t] = (0.3_f64 + 0.9 * neg).sqrt() * u[t];
        }

        // Act
        let outcome = SignBiasOutcome::sign_bias(&z).unwrap();

        // Assert
        assert!(outcome.rejects_null(1e-4), "{outcome:?}");
        assert!(outcome.negative_size_bias().t_stat < -2.0);
    }

    #[test]
    // Purpose
    // -------
    // I.i.d. shocks show no asymmetry.
    //
    // Given
    // -----
    // - 3000 seeded N(0,1) draws.
    //
    // Expect
    // ------
    // - Joint p > 0.001 and all individual p-values in [0, 1].
    fn sign_bias_quiet_on_iid_shocks() {
        let outcome = SignBiasOutcome::sign_bias(&draws(3000, 4)).unwrap();

        assert!(outcome.p_value() > 0.001, "{outcome:?}");
        for c in [outcome.sign_bias_test(), outcome.negative_size_bias(), outcome.positive_size_bias()] {
            assert!((0.0..=1.0).contains(&c.p_value));
        }
    }

    #[test]
    // Purpose
    // -------
    // All-positive shocks make the design singular.
    //
    // Given
    // -----
    // - z_t = 1 + t/10.
    //
    // Expect
    // ------
    // - `SingularDesign`.
    fn sign_bias_one_signed_input_is_singular() {
        let z: Vec<f64> = (0..20).map(|t| 1.0 + t as f64 / 10.0).collect();

        assert!(matches!(SignBiasOutcome::sign_bias(&z), Err(TestError::SingularDesign { .. })));
    }
}
