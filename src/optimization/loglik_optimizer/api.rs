//! High-level entry point for maximizing a `LogLikelihood`.
//!
//! Picks an L-BFGS solver with Hager–Zhang or More–Thuente line search,
//! wraps the model in an `ArgMinAdapter` (which minimizes `−ℓ(θ)`), and hands
//! both to `run_lbfgs`. A run whose line search aborts on an inadmissible
//! trial point is resumed from its best point with More–Thuente, which
//! restarts L-BFGS with an empty curvature history.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};
use tracing::debug;

/// Resumptions after a line-search abort before the outcome is returned.
const MAX_RESUMES: usize = 3;

/// Maximize `ℓ(θ)` with L-BFGS.
///
/// Parameters
/// ----------
/// - `f`: model implementing [`LogLikelihood`].
/// - `theta0`: starting point in unconstrained space.
/// - `data`: observations passed through to `value`/`grad`.
/// - `opts`: tolerances, line search, L-BFGS memory.
///
/// Returns
/// -------
/// An [`OptimOutcome`] with `θ̂`, `ℓ(θ̂)`, termination status, and counters
/// summed over resumptions. A run that still ends in a line-search abort is
/// returned with `converged == false`.
///
/// Errors
/// ------
/// - Anything raised by `f.check(theta0, data)`.
/// - Solver construction errors (invalid tolerances).
/// - Runtime errors from the model or line search, converted to `OptError`.
///
/// Examples
/// --------
/// ```
/// use ndarray::array;
/// use rust_volatility::optimization::errors::OptResult;
/// use rust_volatility::optimization::loglik_optimizer::{
///     LogLikelihood, MLEOptions, Theta, maximize,
/// };
///
/// struct Quadratic;
/// impl LogLikelihood for Quadratic {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-(theta[0] - 2.0).powi(2))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Quadratic, array![0.0], &(), &MLEOptions::default()).unwrap();
/// assert!((out.theta_hat[0] - 2.0).abs() < 1e-4);
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let mut best = run_once(f, theta0, data, opts, opts.line_searcher)?;
    for _ in 0..MAX_RESUMES {
        if !best.line_search_aborted() {
            break;
        }
        debug!(status = %best.status, loglik = best.value, "line search aborted; resuming from best point");
        let mut resumed = run_once(f, best.theta_hat.clone(), data, opts, LineSearcher::MoreThuente)?;
        let improved = resumed.value > best.value;
        if resumed.value < best.value {
            break;
        }
        resumed.iterations += best.iterations;
        for (counter, count) in &best.fn_evals {
            *resumed.fn_evals.entry(counter.clone()).or_insert(0) += count;
        }
        best = resumed;
        if !improved {
            break;
        }
    }
    Ok(best)
}

fn run_once<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions, line_searcher: LineSearcher,
) -> OptResult<OptimOutcome> {
    let problem = ArgMinAdapter::new(f, data);
    match line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::{Grad, Tolerances},
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of the maximizer of a Gaussian log-likelihood with both line
    //   searches and with/without analytic gradients.
    // - Rejection of invalid starting points via `check`.
    // - Line-search aborts reported as non-converged after resumption fails.
    // -------------------------------------------------------------------------

    /// Gaussian log-likelihood in (μ, ln σ) for a fixed sample.
    struct GaussianLL {
        analytic: bool,
    }

    impl LogLikelihood for GaussianLL {
        type Data = Vec<f64>;

        fn value(&self, theta: &Theta, data: &Vec<f64>) -> OptResult<f64> {
            let (mu, log_sigma) = (theta[0], theta[1]);
            let s2 = (2.0 * log_sigma).exp();
            let n = data.len() as f64;
            let ssr: f64 = data.iter().map(|x| (x - mu).powi(2)).sum();
            Ok(-0.5 * n * (2.0 * std::f64::consts::PI * s2).ln() - 0.5 * ssr / s2)
        }

        fn check(&self, theta: &Theta, _: &Vec<f64>) -> OptResult<()> {
            if theta.len() != 2 {
                return Err(OptError::ThetaLengthMismatch { expected: 2, actual: theta.len() });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, data: &Vec<f64>) -> OptResult<Grad> {
            if !self.analytic {
                return Err(OptError::GradientNotImplemented);
            }
            let (mu, log_sigma) = (theta[0], theta[1]);
            let s2 = (2.0 * log_sigma).exp();
            let n = data.len() as f64;
            let sum_dev: f64 = data.iter().map(|x| x - mu).sum();
            let ssr: f64 = data.iter().map(|x| (x - mu).powi(2)).sum();
            Ok(array![sum_dev / s2, -n + ssr / s2])
        }
    }

    #[test]
    // Purpose
    // -------
    // `maximize` finds the sample mean and standard deviation.
    //
    // Given
    // -----
    // - Data with mean 2.5 and population variance 1.25.
    // - Both line searches; analytic and finite-difference gradients.
    //
    // Expect
    // ------
    // - μ̂ ≈ 2.5 and σ̂² ≈ 1.25 in every configuration.
    fn maximize_recovers_gaussian_mle() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            for analytic in [true, false] {
                // Arrange
                let tols = Tolerances::new(Some(1e-8), None, Some(200)).unwrap();
                let opts = MLEOptions::new(tols, ls, false, None).unwrap();

                // Act
                let out = maximize(&GaussianLL { analytic }, array![0.0, 0.0], &data, &opts)
                    .unwrap();

                // Assert
                assert_relative_eq!(out.theta_hat[0], 2.5, epsilon = 1e-4);
                assert_relative_eq!((2.0 * out.theta_hat[1]).exp(), 1.25, epsilon = 1e-4);
                assert!(out.converged);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // A failing `check` stops the run before the solver starts.
    //
    // Given
    // -----
    // - A θ of the wrong length.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch`.
    fn maximize_rejects_invalid_start() {
        let res = maximize(&GaussianLL { analytic: true }, array![0.0], &vec![1.0, 2.0], &MLEOptions::default());
        assert!(matches!(res, Err(OptError::ThetaLengthMismatch { .. })));
    }

    /// `ℓ(θ) = θ` on `θ ≤ 1e-3`, inadmissible beyond: every ascent step
    /// leaves the domain.
    struct Walled;

    impl LogLikelihood for Walled {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            if theta[0] > 1e-3 {
                return Err(OptError::NonPositiveVariance { index: 0, value: -theta[0] });
            }
            Ok(theta[0])
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, _: &Theta, _: &()) -> OptResult<Grad> {
            Ok(array![1.0])
        }
    }

    #[test]
    // Purpose
    // -------
    // A run stuck behind an inadmissible region is not reported as
    // converged.
    //
    // Given
    // -----
    // - `Walled` started at θ = 0 with both line searches.
    //
    // Expect
    // ------
    // - `converged == false` and `line_search_aborted()`.
    // - θ̂ inside the admissible region, no worse than the start.
    fn maximize_reports_line_search_abort() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let opts = MLEOptions { line_searcher: ls, ..MLEOptions::default() };

            // Act
            let out = maximize(&Walled, array![0.0], &(), &opts).unwrap();

            // Assert
            assert!(!out.converged, "{ls:?}: {}", out.status);
            assert!(out.line_search_aborted(), "{ls:?}: {}", out.status);
            assert!(out.theta_hat[0] >= 0.0 && out.theta_hat[0] <= 1e-3);
            assert_eq!(out.value, out.theta_hat[0]);
        }
    }
}
