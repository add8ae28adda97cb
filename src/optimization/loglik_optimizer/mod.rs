//! loglik_optimizer — argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Fit the crate's models by maximum likelihood. A model implements
//! [`LogLikelihood`] and calls [`maximize`], which runs L-BFGS with a
//! configurable line search, tolerances, and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into argmin's cost `−ℓ(θ)`.
//! - [`maximize`] validates the start with [`LogLikelihood::check`], builds
//!   the solver ([`builders`]), runs it ([`run::run_lbfgs`]), and returns an
//!   [`OptimOutcome`].
//! - [`finite_diff`] supplies gradients when a model has none (ARIMA) and
//!   Hessians for standard errors (GARCH).
//!
//! Invariants & assumptions
//! ------------------------
//! - Always maximizes; models implement `ℓ` and `∇ℓ`, never the cost.
//! - Inadmissible parameters surface as [`OptError`](crate::optimization::errors::OptError)
//!   values, not panics.
//!
//! Conventions
//! -----------
//! - `θ` is unconstrained; constrained ↔ unconstrained maps belong to the
//!   model layer (see `numerical_stability`).
//! - [`OptimOutcome::value`] is reported on the log-likelihood scale the
//!   model chose (the GARCH and ARIMA models use the per-observation
//!   average).
//!
//! Testing notes
//! -------------
//! - `api` fits a Gaussian toy likelihood with both line searches and both
//!   gradient branches; the submodules test their local contracts.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
