//! Upper-tail probabilities of the reference distributions used by the
//! diagnostics. Construction failures (non-positive degrees of freedom)
//! surface as `TestError::Distribution`.
use crate::statistical_tests::errors::{TestError, TestResult};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

/// `P(χ²(dof) > stat)`.
pub fn chi2_sf(stat: f64, dof: f64) -> TestResult<f64> {
    let dist = ChiSquared::new(dof).map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok(dist.sf(stat.max(0.0)))
}

/// `P(F(d1, d2) > stat)`.
pub fn f_sf(stat: f64, d1: f64, d2: f64) -> TestResult<f64> {
    let dist = FisherSnedecor::new(d1, d2).map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok(dist.sf(stat.max(0.0)))
}

/// Two-sided `P(|t(dof)| > |stat|)`.
pub fn t_two_sided(stat: f64, dof: f64) -> TestResult<f64> {
    let dist =
        StudentsT::new(0.0, 1.0, dof).map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok((2.0 * dist.sf(stat.abs())).min(1.0))
}

/// Standard normal CDF `Φ(x)`.
pub fn normal_cdf(x: f64) -> TestResult<f64> {
    let dist = Normal::new(0.0, 1.0).map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok(dist.cdf(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Upper tails match tabulated critical values.
    //
    // Given
    // -----
    // - χ²(1) at 3.841459, t(∞-ish) at 1.96, F(2, 100) at 3.087.
    //
    // Expect
    // ------
    // - Tail probabilities ≈ 0.05.
    fn tails_match_tabulated_critical_values() {
        assert_relative_eq!(chi2_sf(3.841459, 1.0).unwrap(), 0.05, epsilon = 1e-5);
        assert_relative_eq!(t_two_sided(1.959964, 1e6).unwrap(), 0.05, epsilon = 1e-4);
        assert_relative_eq!(f_sf(3.087, 2.0, 100.0).unwrap(), 0.05, epsilon = 1e-3);
        assert_relative_eq!(normal_cdf(0.0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Invalid degrees of freedom are reported, not panicked on.
    //
    // Given
    // -----
    // - dof = 0.
    //
    // Expect
    // ------
    // - `TestError::Distribution`.
    fn zero_dof_is_an_error() {
        assert!(matches!(chi2_sf(1.0, 0.0), Err(TestError::Distribution(_))));
    }
}
