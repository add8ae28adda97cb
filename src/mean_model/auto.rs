//! Automatic ARIMA order selection.
//!
//! The differencing order is the smallest `d` whose differenced series
//! rejects the ADF unit-root null at `alpha`. ARMA orders are then chosen
//! by an information criterion over a `(p, q)` grid. All grid candidates
//! condition on the same `max_p` leading observations so their criteria
//! are computed on one sample; the winner is refit conditioning only on
//! its own `p`.
use crate::{
    comparison::{Criterion, ModelEntry},
    mean_model::{
        errors::{ArimaError, ArimaResult},
        fit::ArimaFit,
        model::ArimaModel,
        spec::{ArimaOrder, ArimaSpec, difference},
    },
    optimization::loglik_optimizer::MLEOptions,
    statistical_tests::{AdfLag, AdfOutcome, AdfRegression, TestOutcome},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaOptions {
    pub max_p: usize,
    pub max_q: usize,
    pub max_d: usize,
    /// Include an intercept when `d < 2`.
    pub with_constant: bool,
    pub criterion: Criterion,
    /// Significance level of the ADF tests that pick `d`.
    pub alpha: f64,
    pub adf_regression: AdfRegression,
    #[serde(skip)]
    pub mle_opts: MLEOptions,
}

impl Default for AutoArimaOptions {
    fn default() -> Self {
        AutoArimaOptions {
            max_p: 3,
            max_q: 3,
            max_d: 2,
            with_constant: true,
            criterion: Criterion::Aic,
            alpha: 0.05,
            adf_regression: AdfRegression::Constant,
            mle_opts: MLEOptions::default(),
        }
    }
}

/// ADF result on the `d`-times differenced series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffStep {
    pub d: usize,
    pub adf: AdfOutcome,
}

/// One successfully fitted grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub order: ArimaOrder,
    pub entry: ModelEntry,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoArimaResult {
    pub fit: ArimaFit,
    pub d: usize,
    pub diff_steps: Vec<DiffStep>,
    pub candidates: Vec<Candidate>,
    pub criterion: Criterion,
}

/// Smallest `d ≤ max_d` whose differenced series is ADF-stationary.
///
/// Falls back to `max_d` (with a warning) when no order rejects.
///
/// # Errors
/// - [`ArimaError::Test`] when an ADF test cannot run.
pub fn select_d(series: &[f64], opts: &AutoArimaOptions) -> ArimaResult<(usize, Vec<DiffStep>)> {
    let mut steps = Vec::with_capacity(opts.max_d + 1);
    for d in 0..=opts.max_d {
        let adf = AdfOutcome::adf(&difference(series, d), opts.adf_regression, AdfLag::default())?;
        debug!(d, stat = adf.statistic(), p_value = adf.p_value(), "ADF on differenced series");
        steps.push(DiffStep { d, adf });
        if adf.rejects_null(opts.alpha) {
            return Ok((d, steps));
        }
    }
    warn!(max_d = opts.max_d, "no differencing order rejected a unit root; using max_d");
    Ok((opts.max_d, steps))
}

/// Select and fit an ARIMA model for `series`.
///
/// # Errors
/// - [`ArimaError::InvalidOrder`] for search bounds beyond the supported
///   orders.
/// - [`ArimaError::Test`] from the differencing tests.
/// - [`ArimaError::NoValidCandidate`] when every grid point fails.
pub fn auto_arima(series: &[f64], opts: &AutoArimaOptions) -> ArimaResult<AutoArimaResult> {
    ArimaOrder::new(opts.max_p, opts.max_d, opts.max_q)?;
    let (d, diff_steps) = select_d(series, opts)?;
    let with_constant = opts.with_constant && d < 2;
    let burn = opts.max_p;

    let mut candidates = Vec::new();
    let mut fits = Vec::new();
    let mut tried = 0;
    for p in 0..=opts.max_p {
        for q in 0..=opts.max_q {
            tried += 1;
            let order = ArimaOrder::new(p, d, q)?;
            let model = ArimaModel::new(ArimaSpec::new(order, with_constant));
            match model.fit(series, Some(burn), &opts.mle_opts) {
                Ok(fit) => {
                    let entry = ModelEntry::new(order.to_string(), fit.loglik, fit.spec.n_params(), fit.nobs);
                    debug!(order = %order, aic = entry.aic, bic = entry.bic, "ARIMA candidate");
                    candidates.push(Candidate { order, entry, converged: fit.converged() });
                    fits.push(fit);
                }
                Err(err) => debug!(order = %order, error = %err, "skipping ARIMA candidate"),
            }
        }
    }

    let mut best: Option<usize> = None;
    for (i, cand) in candidates.iter().enumerate() {
        let better = match best {
            Some(b) => opts.criterion.of(&cand.entry) < opts.criterion.of(&candidates[b].entry),
            None => true,
        };
        if better {
            best = Some(i);
        }
    }
    let best = best.ok_or(ArimaError::NoValidCandidate { tried })?;
    let order = candidates[best].order;
    info!(order = %order, criterion = opts.criterion.label(), "selected ARIMA order");

    let fit = if order.p == burn {
        fits.swap_remove(best)
    } else {
        let model = ArimaModel::new(ArimaSpec::new(order, with_constant));
        match model.fit(series, None, &opts.mle_opts) {
            Ok(fit) => fit,
            Err(err) => {
                warn!(order = %order, error = %err, "refit on full sample failed; keeping grid fit");
                fits.swap_remove(best)
            }
        }
    };

    Ok(AutoArimaResult { fit, d, diff_steps, candidates, criterion: opts.criterion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Differencing-order choice on stationary and integrated data.
    // - The candidate table, its common sample and the refit of the winner.
    // - Rejection of unsupported search bounds.
    // -------------------------------------------------------------------------

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    fn small_grid() -> AutoArimaOptions {
        AutoArimaOptions { max_p: 2, max_q: 1, ..AutoArimaOptions::default() }
    }

    #[test]
    // Purpose
    // -------
    // A strongly mean-reverting AR(1) needs no differencing.
    //
    // Given
    // -----
    // - y_t = 0.3 y_{t−1} + e_t, n = 500.
    //
    // Expect
    // ------
    // - d = 0 after a single ADF step; a constant is included.
    fn stationary_series_selects_d0() {
        // Arrange
        let e = noise(500, 21);
        let mut y = vec![0.0; 500];
        for t in 1..500 {
            y[t] = 0.3 * y[t - 1] + e[t];
        }

        // Act
        let result = auto_arima(&y, &small_grid()).unwrap();

        // Assert
        assert_eq!(result.d, 0);
        assert_eq!(result.diff_steps.len(), 1);
        assert!(result.fit.spec.with_constant);
    }

    #[test]
    // Purpose
    // -------
    // An integrated series is differenced once.
    //
    // Given
    // -----
    // - Cumulated AR(1) increments (φ = 0.3), n = 600.
    //
    // Expect
    // ------
    // - d = 1 with two ADF steps; the second rejects.
    // - Every candidate shares one sample size; the table holds 6 rows.
    fn integrated_series_selects_d1_on_common_sample() {
        // Arrange
        let e = noise(600, 33);
        let mut dy = vec![0.0; 600];
        for t in 1..600 {
            dy[t] = 0.3 * dy[t - 1] + e[t];
        }
        let mut y = vec![100.0];
        for x in &dy {
            let last = y[y.len() - 1];
            y.push(last + x);
        }

        // Act
        let result = auto_arima(&y, &small_grid()).unwrap();

        // Assert
        assert_eq!(result.d, 1);
        assert_eq!(result.diff_steps.len(), 2);
        assert!(result.diff_steps[1].adf.rejects_null(0.05));
        assert_eq!(result.candidates.len(), 6);
        let n0 = result.candidates[0].entry.nobs;
        assert!(result.candidates.iter().all(|c| c.entry.nobs == n0));
        assert_eq!(result.fit.spec.order.d, 1);
        assert_eq!(result.fit.burn, result.fit.spec.order.p);
    }

    #[test]
    // Purpose
    // -------
    // Search bounds beyond the supported orders are rejected.
    //
    // Given
    // -----
    // - max_d = 3.
    //
    // Expect
    // ------
    // - `InvalidOrder`.
    fn auto_arima_rejects_unsupported_bounds() {
        let opts = AutoArimaOptions { max_d: 3, ..AutoArimaOptions::default() };

        assert!(matches!(auto_arima(&noise(200, 1), &opts), Err(ArimaError::InvalidOrder { .. })));
    }
}
