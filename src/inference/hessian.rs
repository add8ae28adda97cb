//! inference::hessian — observed-information and sandwich covariance.
//!
//! Purpose
//! -------
//! Turn a finite-difference Hessian of the average log-likelihood into a
//! parameter covariance matrix, classical or robust, without ever forming an
//! explicit inverse.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`]: `J⁺` (classical) or `J⁺ S J⁺` (sandwich), where
//!   `J` is the Hessian of the negative average log-likelihood at `θ̂` and
//!   `S` the average-score covariance from `inference::hac`.
//! - [`pseudo_inverse`]: eigen-based Moore–Penrose inverse of a symmetric
//!   matrix, reused by the ARIMA Gauss–Newton covariance.
//! - [`standard_errors`]: square roots of a covariance diagonal.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything is on the average scale; callers divide by `n` to obtain
//!   the covariance of `θ̂`.
//! - Eigenvalues `λ ≤ EIGEN_EPS` are dropped, so weakly identified
//!   directions contribute nothing rather than blowing up.
//!
//! Testing notes
//! -------------
//! - Unit tests compare against analytic inverses of diagonal quadratics and
//!   check that the sandwich collapses to the classical estimate when
//!   `S = J`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, finite_diff::compute_hessian},
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Covariance on the average scale from the observed information.
///
/// Parameters
/// ----------
/// - `f`: gradient of the **negative** average log-likelihood.
/// - `theta_hat`: estimate at which the information is evaluated.
/// - `scores`: `Some(S)` for the sandwich `J⁺ S J⁺`, `None` for `J⁺`.
///
/// Errors
/// ------
/// - Propagates Hessian validation errors from `compute_hessian`.
pub fn calc_covariance<F: Fn(&Theta) -> Grad>(
    f: &F, theta_hat: &Theta, scores: Option<&Array2<f64>>,
) -> OptResult<Array2<f64>> {
    let obs_info = compute_hessian(f, theta_hat)?;
    let j_pinv = pseudo_inverse(&obs_info);
    Ok(match scores {
        Some(s) => j_pinv.dot(s).dot(&j_pinv),
        None => j_pinv,
    })
}

/// Moore–Penrose inverse of a symmetric matrix via eigendecomposition,
/// keeping only eigenvalues above [`EIGEN_EPS`].
pub fn pseudo_inverse(mat: &Array2<f64>) -> Array2<f64> {
    let n = mat.nrows();
    let mut dmat = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(mat, &mut dmat);
    let eigen = dmat.symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut out = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            let coeff = q[(i, k)] / lambda;
            for j in 0..n {
                out[[i, j]] += coeff * q[(j, k)];
            }
        }
    }
    out
}

/// `sqrt(max(diag(cov), 0))`.
pub fn standard_errors(cov: &Array2<f64>) -> Array1<f64> {
    cov.diag().mapv(|v| v.max(0.0).sqrt())
}

// ---- Helper methods ----

fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    for ((i, j), &v) in src.indexed_iter() {
        dst[(i, j)] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Copying into `DMatrix`.
    // - Pseudo-inverse on full-rank and rank-deficient matrices.
    // - Classical and sandwich covariance for linear gradient maps.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `fill_dmatrix` copies entries unchanged.
    //
    // Given
    // -----
    // - [[2, 0.5], [0.5, 1]].
    //
    // Expect
    // ------
    // - Identical entries in the `DMatrix`.
    fn fill_dmatrix_copies_entries() {
        let src = array![[2.0, 0.5], [0.5, 1.0]];
        let mut dst = DMatrix::<f64>::zeros(2, 2);

        fill_dmatrix(&src, &mut dst);

        assert_eq!(dst[(0, 0)], 2.0);
        assert_eq!(dst[(0, 1)], 0.5);
        assert_eq!(dst[(1, 0)], 0.5);
        assert_eq!(dst[(1, 1)], 1.0);
    }

    #[test]
    // Purpose
    // -------
    // The pseudo-inverse inverts a full-rank matrix and ignores a null
    // direction.
    //
    // Given
    // -----
    // - A = [[2, 1], [1, 2]] and B = diag(4, 0).
    //
    // Expect
    // ------
    // - A⁺ = A⁻¹ = (1/3)[[2, −1], [−1, 2]]; B⁺ = diag(0.25, 0).
    fn pseudo_inverse_full_and_deficient_rank() {
        let a_inv = pseudo_inverse(&array![[2.0, 1.0], [1.0, 2.0]]);
        assert_relative_eq!(a_inv[[0, 0]], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(a_inv[[0, 1]], -1.0 / 3.0, epsilon = 1e-12);

        let b_inv = pseudo_inverse(&array![[4.0, 0.0], [0.0, 0.0]]);
        assert_relative_eq!(b_inv[[0, 0]], 0.25, epsilon = 1e-12);
        assert_relative_eq!(b_inv[[1, 1]], 0.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Classical covariance equals the analytic inverse information; the
    // sandwich with `S = J` collapses to it.
    //
    // Given
    // -----
    // - Gradient map g(θ) = A θ with A = diag(4, 1).
    //
    // Expect
    // ------
    // - SEs (0.5, 1.0) in both cases; doubling S scales variances by 2.
    fn calc_covariance_classical_and_sandwich() {
        // Arrange
        let a = array![[4.0, 0.0], [0.0, 1.0]];
        let grad = |t: &Theta| a.dot(t);
        let theta = array![0.3, -0.7];

        // Act
        let classical = calc_covariance(&grad, &theta, None).unwrap();
        let sandwich = calc_covariance(&grad, &theta, Some(&a)).unwrap();
        let inflated = calc_covariance(&grad, &theta, Some(&(&a * 2.0))).unwrap();

        // Assert
        let se = standard_errors(&classical);
        assert_relative_eq!(se[0], 0.5, epsilon = 1e-5);
        assert_relative_eq!(se[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(sandwich[[0, 0]], classical[[0, 0]], epsilon = 1e-5);
        assert_relative_eq!(inflated[[1, 1]], 2.0 * classical[[1, 1]], epsilon = 1e-5);
    }
}
