//! optimization — maximum-likelihood machinery shared by the mean and
//! variance models.
//!
//! Purpose
//! -------
//! Provide a single place where log-likelihoods are maximized: ARIMA's
//! conditional sum-of-squares likelihood and the GARCH/GJR-GARCH
//! quasi-likelihood both implement [`loglik_optimizer::LogLikelihood`] and are
//! handed to [`loglik_optimizer::maximize`], which runs argmin's L-BFGS.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: trait, options, solver wiring, finite-difference
//!   fallbacks, outcome normalization.
//! - `numerical_stability`: transforms that keep parameters inside their
//!   admissible regions while the optimizer works in ℝᵏ.
//! - `errors`: the [`errors::OptError`] surface, including the model-side
//!   evaluation failures raised from inside log-likelihoods.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every solver maximizes `ℓ(θ)` by minimizing `c(θ) = −ℓ(θ)`.
//! - Parameter transforms live in the model layer; the optimizer only ever
//!   sees unconstrained `θ`.
//!
//! Conventions
//! -----------
//! - Logging is limited to `debug`/`trace` events from the L-BFGS runner;
//!   the pipeline reports convergence after the fact.
//!
//! Testing notes
//! -------------
//! - Submodules test solver wiring, derivatives, and transforms on toy
//!   objectives; model modules test full fits.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
