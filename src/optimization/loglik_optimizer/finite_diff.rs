//! loglik_optimizer::finite_diff — finite-difference derivatives with error capture.
//!
//! Purpose
//! -------
//! Supply gradients for likelihoods without an analytic derivative (ARIMA)
//! and Hessians for observed-information standard errors (GARCH), on top of
//! the `finitediff` crate.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`]: central differences of a fallible objective, retried
//!   with forward differences when any evaluation fails or the result is
//!   not finite.
//! - [`run_fd_diff`]: the forward-difference leg with error capture.
//! - [`compute_hessian`]: central-difference Jacobian of a gradient map,
//!   forward fallback, then symmetrization.
//!
//! Invariants & assumptions
//! ------------------------
//! - `finitediff` closures must return `f64`, so the first error raised by
//!   the objective is parked in a `RefCell` and the closure returns `NaN`.
//!   A parked error always wins over the numeric result.
//! - Returned gradients and Hessians pass [`validate_grad`] /
//!   [`validate_hessian`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy paths, error propagation from the
//!   objective, central → forward fallback, and symmetrization.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Gradient of a fallible scalar objective by finite differences.
///
/// Tries central differences first. If an evaluation failed or the
/// gradient is not finite, retries once with forward differences.
///
/// # Errors
/// - The first error raised by `func` on the forward leg.
/// - [`OptError::InvalidGradient`] if the forward gradient is not finite.
pub fn fd_gradient<F, E>(func: &F, theta: &Theta) -> OptResult<Grad>
where
    F: Fn(&Theta) -> Result<f64, E>,
    E: Into<OptError>,
{
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let plain = |x: &Theta| -> f64 {
        match func(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e.into());
                }
                f64::NAN
            }
        }
    };
    let central = theta.central_diff(&plain);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &plain, &closure_err)
}

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// Clears `closure_err`, differentiates, then returns any error parked by
/// `func` during the run before validating the gradient.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<OptError>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Hessian as the finite-difference Jacobian of a gradient map.
///
/// Central differences are preferred; forward differences are used when the
/// central result fails validation. The result is symmetrized in place.
///
/// # Errors
/// - Validation errors from the forward-difference Hessian.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// ---- Helper methods ----

fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
