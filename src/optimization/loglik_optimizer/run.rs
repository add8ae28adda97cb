//! Runs an argmin solver on an adapted likelihood and normalizes the result
//! into an [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, IterState, Solver, State};
use argmin_math::ArgminL2Norm;
use tracing::{debug, trace};

/// Execute `solver` from `theta0` and collect the best state.
///
/// Applies `opts.tols.max_iter` to the executor. With `opts.verbose` the
/// starting log-likelihood is logged at `debug`, and the `obs_slog` feature
/// additionally attaches argmin's terminal observer. The reported `value` is
/// the best log-likelihood, i.e. the negated best cost.
///
/// # Errors
/// - Model and line-search errors raised during the run.
/// - Validation errors from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }

    let max_iter = opts.tols.max_iter;
    #[allow(unused_mut)]
    let mut executor = Executor::new(problem, solver).configure(|state| {
        let state = state.param(theta0);
        match max_iter {
            Some(n) => state.max_iters(n as u64),
            None => state,
        }
    });

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    let outcome =
        OptimOutcome::new(state.take_best_param(), -state.get_best_cost(), termination, iterations, fn_evals, grad)?;
    trace!(iterations, loglik = outcome.value, status = %outcome.status, "L-BFGS finished");
    Ok(outcome)
}

fn log_initial_state<F: LogLikelihood>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) {
    let loglik = problem.cost(theta0).map(|c| -c).ok();
    let grad_norm = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    debug!(?loglik, ?grad_norm, dim = theta0.len(), "starting L-BFGS");
}
