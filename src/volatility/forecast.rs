//! Multi-step forecasts of the conditional mean and variance.
//!
//! Future squared shocks are replaced by their expectation: `E[ε²] = σ²`
//! and, for symmetric innovations, `E[I[ε<0] ε²] = ½σ²`. In-sample terms
//! use the realized residuals; pre-sample terms use the backcast.
use crate::volatility::{
    errors::{GarchError, GarchResult},
    fit::GarchFit,
    spec::{Distribution, MeanSpec},
};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Trading days per year used to annualize volatility.
pub const TRADING_DAYS: f64 = 252.0;

/// Forecast path for steps `1..=horizon`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityForecast {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub volatility: Vec<f64>,
    /// `√252 · σ_h`.
    pub annualized_volatility: Vec<f64>,
    /// Volatility of the cumulative return over steps `1..=h`.
    pub cumulative_volatility: Vec<f64>,
    /// One-step value-at-risk at each step, reported as a positive loss.
    pub value_at_risk: Vec<f64>,
    pub var_level: f64,
}

impl VolatilityForecast {
    pub fn horizon(&self) -> usize {
        self.variance.len()
    }

    /// Average annualized volatility over the whole horizon.
    pub fn mean_annualized_volatility(&self) -> f64 {
        match self.horizon() {
            0 => f64::NAN,
            h => self.annualized_volatility.iter().sum::<f64>() / h as f64,
        }
    }
}

impl GarchFit {
    /// Forecast `horizon` steps past the end of the sample.
    ///
    /// # Errors
    /// - [`GarchError::InvalidHorizon`] when `horizon == 0`.
    /// - [`GarchError::InvalidLevel`] unless `var_level ∈ (0, 1)`.
    pub fn forecast(&self, horizon: usize, var_level: f64) -> GarchResult<VolatilityForecast> {
        if horizon == 0 {
            return Err(GarchError::InvalidHorizon { horizon });
        }
        if !(var_level > 0.0 && var_level < 1.0) {
            return Err(GarchError::InvalidLevel { level: var_level });
        }

        let n = self.y.len();
        let burn = self.spec.mean.burn();
        let bc = self.backcast;
        let p = &self.params;

        let mut shock_sq: Vec<f64> = Vec::with_capacity(n + horizon);
        let mut neg_shock_sq: Vec<f64> = Vec::with_capacity(n + horizon);
        let mut sigma2: Vec<f64> = Vec::with_capacity(n + horizon);
        for t in 0..n {
            if t < burn {
                shock_sq.push(bc);
                neg_shock_sq.push(0.5 * bc);
                sigma2.push(bc);
            } else {
                let e = self.residuals[t - burn];
                shock_sq.push(e * e);
                neg_shock_sq.push(if e < 0.0 { e * e } else { 0.0 });
                sigma2.push(self.conditional_variance[t - burn]);
            }
        }

        let lag = |v: &[f64], t: usize, i: usize, pre: f64| t.checked_sub(i).map_or(pre, |s| v[s]);
        let mut ys: Vec<f64> = self.y.to_vec();
        for t in n..n + horizon {
            let mut s2 = p.omega;
            for (i, a) in p.alpha.iter().enumerate() {
                s2 += a * lag(&shock_sq, t, i + 1, bc);
            }
            for (j, g) in p.gamma.iter().enumerate() {
                s2 += g * lag(&neg_shock_sq, t, j + 1, 0.5 * bc);
            }
            for (k, b) in p.beta.iter().enumerate() {
                s2 += b * lag(&sigma2, t, k + 1, bc);
            }
            sigma2.push(s2);
            shock_sq.push(s2);
            neg_shock_sq.push(0.5 * s2);

            let m = match self.spec.mean {
                MeanSpec::Zero => 0.0,
                MeanSpec::Constant => p.mean[0],
                MeanSpec::Ar(k) => p.mean[0] + (1..=k).map(|i| p.mean[i] * ys[t - i]).sum::<f64>(),
            };
            ys.push(m);
        }

        let mean = ys[n..].to_vec();
        let variance = sigma2[n..].to_vec();
        let volatility: Vec<f64> = variance.iter().map(|v| v.sqrt()).collect();
        let annualized_volatility = volatility.iter().map(|v| v * TRADING_DAYS.sqrt()).collect();
        let cumulative_volatility = variance
            .iter()
            .scan(0.0, |acc, v| {
                *acc += v;
                Some(acc.sqrt())
            })
            .collect();
        let q = self.innovation_quantile(1.0 - var_level)?;
        let value_at_risk = mean.iter().zip(&volatility).map(|(m, s)| -(m + q * s)).collect();

        Ok(VolatilityForecast {
            mean,
            variance,
            volatility,
            annualized_volatility,
            cumulative_volatility,
            value_at_risk,
            var_level,
        })
    }

    /// Quantile of the unit-variance innovation distribution.
    fn innovation_quantile(&self, prob: f64) -> GarchResult<f64> {
        match (self.spec.dist, self.params.nu) {
            (Distribution::StudentT, Some(nu)) => {
                let t = StudentsT::new(0.0, 1.0, nu).map_err(|e| GarchError::Distribution(e.to_string()))?;
                Ok(t.inverse_cdf(prob) * ((nu - 2.0) / nu).sqrt())
            }
            _ => {
                let z = Normal::new(0.0, 1.0).map_err(|e| GarchError::Distribution(e.to_string()))?;
                Ok(z.inverse_cdf(prob))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::{
        fit::{GarchFitOptions, fit_garch},
        params::GarchParams,
        simulate::{SimOptions, simulate},
        spec::{GarchSpec, VolatilitySpec},
    };
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the analytic variance recursion, its convergence to
    // the unconditional variance, the derived volatility quantities and
    // argument validation.
    // -------------------------------------------------------------------------

    fn fitted(dist: Distribution) -> GarchFit {
        let spec = GarchSpec::new(MeanSpec::Constant, VolatilitySpec::Garch { p: 1, q: 1 }, dist).unwrap();
        let nu = match dist {
            Distribution::StudentT => Some(7.0),
            Distribution::Normal => None,
        };
        let truth = GarchParams::new(&spec, array![0.04], 0.04, array![0.1], Array1::zeros(0), array![0.85], nu)
            .unwrap();
        let path = simulate(&spec, &truth, 1500, &SimOptions { seed: 11, burn: 300 }).unwrap();
        fit_garch(&path.returns, spec, &GarchFitOptions::default()).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The first step matches the hand recursion and the path approaches the
    // unconditional variance.
    //
    // Given
    // -----
    // - A fitted GARCH(1,1) and a 500-step forecast.
    //
    // Expect
    // ------
    // - σ²₁ = ω + α ε²_T + β σ²_T.
    // - σ²_500 ≈ ω / (1 − α − β).
    fn forecast_matches_recursion_and_mean_reverts() {
        // Arrange
        let fit = fitted(Distribution::Normal);
        let last = fit.residuals.len() - 1;
        let p = &fit.params;
        let expected =
            p.omega + p.alpha[0] * fit.residuals[last].powi(2) + p.beta[0] * fit.conditional_variance[last];

        // Act
        let fc = fit.forecast(500, 0.95).unwrap();

        // Assert
        assert_relative_eq!(fc.variance[0], expected, epsilon = 1e-12);
        assert_relative_eq!(fc.variance[499], fit.unconditional_variance(), max_relative = 1e-3);
        assert!(fc.mean.iter().all(|m| *m == p.mean[0]));
    }

    #[test]
    // Purpose
    // -------
    // Derived quantities are consistent with the variance path.
    //
    // Given
    // -----
    // - A 30-step forecast from a Student-t fit.
    //
    // Expect
    // ------
    // - Annualized = √252 σ.
    // - Cumulative volatility starts at σ₁ and increases.
    // - Positive 99% VaR at every step.
    fn derived_quantities_are_consistent() {
        // Arrange
        let fit = fitted(Distribution::StudentT);

        // Act
        let fc = fit.forecast(30, 0.99).unwrap();

        // Assert
        assert_eq!(fc.horizon(), 30);
        assert_relative_eq!(fc.annualized_volatility[0], fc.volatility[0] * 252f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(fc.cumulative_volatility[0], fc.volatility[0], epsilon = 1e-12);
        assert!(fc.cumulative_volatility.windows(2).all(|w| w[1] > w[0]));
        assert!(fc.value_at_risk.iter().all(|v| *v > 0.0));
        assert!(fc.mean_annualized_volatility() > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Invalid forecast arguments are rejected.
    //
    // Given
    // -----
    // - horizon = 0; level = 1.0.
    //
    // Expect
    // ------
    // - `InvalidHorizon` and `InvalidLevel`.
    fn rejects_bad_arguments() {
        let fit = fitted(Distribution::Normal);

        assert_eq!(fit.forecast(0, 0.95), Err(GarchError::InvalidHorizon { horizon: 0 }));
        assert_eq!(fit.forecast(5, 1.0), Err(GarchError::InvalidLevel { level: 1.0 }));
    }
}
