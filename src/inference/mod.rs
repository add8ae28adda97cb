//! inference — parameter covariance for fitted models.
//!
//! Purpose
//! -------
//! Post-estimation uncertainty for the GARCH family and ARIMA: classical
//! observed-information covariance, the robust QMLE sandwich, and the HAC /
//! OPG score covariance that feeds it.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`]: `J⁺` or `J⁺ S J⁺` on the average scale.
//! - [`calculate_avg_scores_cov`] with [`HACOptions`] / [`KernelType`]:
//!   the score covariance `S`.
//! - [`pseudo_inverse`] and [`standard_errors`]: shared linear algebra.
//! - [`coef_table`]: estimates, standard errors and Wald p-values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scores are per-observation gradients of `ℓ_t(θ)` in unconstrained
//!   θ-space, shaped `n × p`.
//! - Model code maps θ-space covariances into model space with the delta
//!   method (`numerical_stability::delta_method`).
//!
//! Conventions
//! -----------
//! - Pure numerical code: no logging, no I/O.

pub mod errors;
pub mod hac;
pub mod hessian;
pub mod kernel;
pub mod summary;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hac::{HACOptions, calculate_avg_scores_cov};
pub use self::hessian::{calc_covariance, pseudo_inverse, standard_errors};
pub use self::kernel::KernelType;
pub use self::summary::{CoefRow, coef_table};

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hac::{HACOptions, calculate_avg_scores_cov};
    pub use super::hessian::{calc_covariance, standard_errors};
    pub use super::kernel::KernelType;
}
