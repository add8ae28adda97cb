//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Hide argmin's generic wiring behind two builders, one per line search,
//! that apply the history size and tolerances from [`MLEOptions`].
//!
//! Conventions
//! -----------
//! - Builders never set `theta0` or `max_iters`; those are runtime concerns
//!   of `run_lbfgs`.
//! - Tolerances rejected by argmin surface as `OptError` through
//!   `From<argmin::core::Error>`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search.
///
/// # Errors
/// - `OptError` when argmin rejects a tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    build_lbfgs(HagerZhangLS::new(), opts)
}

/// L-BFGS with More–Thuente line search.
///
/// # Errors
/// - `OptError` when argmin rejects a tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    build_lbfgs(MoreThuenteLS::new(), opts)
}

/// L-BFGS over `line_search` with `opts.lbfgs_mem` (or
/// [`DEFAULT_LBFGS_MEM`]) history pairs.
fn build_lbfgs<L>(line_search: L, opts: &MLEOptions) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LBFGS::new(line_search, mem), opts)
}

/// Apply optional gradient and cost-change tolerances to any L-BFGS solver.
///
/// `None` leaves argmin's default in place.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of both solver flavours with default and explicit
    //   L-BFGS memory.
    // - Tolerance wiring through `configure_lbfgs`.
    //
    // They intentionally DO NOT cover:
    // - Executor behavior, which is exercised through `maximize`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders succeed with default and explicit memory.
    //
    // Given
    // -----
    // - Valid tolerances; `lbfgs_mem` of `None` and `Some(11)`.
    //
    // Expect
    // ------
    // - Every combination returns `Ok`.
    fn builders_accept_default_and_explicit_memory() {
        for mem in [None, Some(11)] {
            // Arrange
            let tols = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).unwrap();
            let hz = MLEOptions::new(tols, LineSearcher::HagerZhang, false, mem).unwrap();
            let mt = MLEOptions::new(tols, LineSearcher::MoreThuente, false, mem).unwrap();

            // Act / Assert
            assert!(build_optimizer_hager_zhang(&hz).is_ok());
            assert!(build_optimizer_more_thuente(&mt).is_ok());
        }
    }

    #[test]
    // Purpose
    // -------
    // `configure_lbfgs` is a no-op when both tolerances are absent.
    //
    // Given
    // -----
    // - Tolerances with only `max_iter`.
    //
    // Expect
    // ------
    // - `Ok(_)`.
    fn configure_lbfgs_respects_absent_tolerances() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).unwrap();
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None).unwrap();

        assert!(configure_lbfgs(raw, &opts).is_ok());
    }
}
