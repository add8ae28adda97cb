//! numerical_stability — constrained ↔ unconstrained parameter maps.
//!
//! Purpose
//! -------
//! Keep the optimizer in an unconstrained space while the mean and variance
//! models live on constrained parameter sets: positive intercepts, GARCH
//! weights that respect covariance stationarity, and ARMA polynomials that
//! are stationary and invertible.
//!
//! Key behaviors
//! -------------
//! - Stable scalar transforms (`safe_softplus`, its inverse, `safe_logistic`).
//! - Scaled softmax with implicit slack for `(α, γ/2, β)` together with its
//!   inverse and Jacobian-transpose product.
//! - Durbin–Levinson PACF map for AR and MA polynomials.
//! - `delta_method` for pushing θ-space covariances into model space.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; shape and domain validation belongs to the model
//!   layer.
//! - `STATIONARITY_MARGIN` keeps every weight sum strictly below one.
//!
//! Conventions
//! -----------
//! - Pure functions over `ndarray` types; no logging and no I/O.
//!
//! Testing notes
//! -------------
//! - [`transformations`] checks round trips, mass bounds, and derivatives
//!   against finite differences.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, GENERAL_TOL, LOGIT_EPS, STATIONARITY_MARGIN, coeffs_to_pacf, delta_method,
    pacf_to_coeffs, safe_logistic, safe_softmax, safe_softmax_deriv, safe_softmax_inv,
    safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, GENERAL_TOL, LOGIT_EPS, STATIONARITY_MARGIN, delta_method, safe_logistic,
        safe_softmax, safe_softplus, safe_softplus_inv,
    };
}
