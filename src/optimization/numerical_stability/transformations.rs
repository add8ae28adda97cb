//! Numerically stable parameter transforms.
//!
//! Maps between the unconstrained optimizer space and the constrained
//! parameter spaces of the mean and variance models:
//!
//! - [`safe_softplus`] / [`safe_softplus_inv`]: ℝ ↔ (0, ∞), used for `ω`
//!   and the Student-t degrees of freedom.
//! - [`safe_logistic`]: derivative of softplus.
//! - [`safe_softmax`] / [`safe_softmax_inv`]: logits ↔ non-negative weights
//!   with an implicit slack, so that `Σ w < 1 − STATIONARITY_MARGIN`. The
//!   GARCH family stores `(α, γ/2, β)` as these weights.
//! - [`safe_softmax_deriv`]: in-place Jacobian-transpose product for the
//!   scaled softmax.
//! - [`pacf_to_coeffs`] / [`coeffs_to_pacf`]: partial autocorrelations in
//!   `(-1, 1)` ↔ stationary AR coefficients (Durbin–Levinson). Negated, the
//!   same map yields invertible MA coefficients.
//! - [`delta_method`]: `G Σ Gᵀ` covariance propagation.
//!
//! The cutoff `x > 20.0` in the softplus helpers keeps `f64` arithmetic in
//! a well-conditioned regime.
use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};

/// ε buffer enforcing strict inequalities in stationarity constraints.
pub const STATIONARITY_MARGIN: f64 = 1e-6;

/// Smallest weight passed to `ln` when inverting the softmax.
pub const LOGIT_EPS: f64 = 1e-12;

/// Eigenvalues at or below this threshold are treated as zero.
pub const EIGEN_EPS: f64 = 1e-10;

/// Generic small-denominator guard.
pub const GENERAL_TOL: f64 = 1e-12;

/// Largest partial autocorrelation magnitude produced by the inverse map.
const PACF_CLAMP: f64 = 1.0 - 1e-8;

/// Stable `ln(1 + exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: `ln(exp(x) − 1)`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Stable logistic `1 / (1 + exp(−x))`.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Map logits to weights with an implicit zero-logit slack.
///
/// Returns `w_i = (1 − STATIONARITY_MARGIN) · exp(x_i) / (1 + Σ_j exp(x_j))`,
/// computed with a max shift. An empty input yields an empty output.
pub fn safe_softmax(logits: ArrayView1<f64>) -> Array1<f64> {
    let max_x = logits.fold(0.0_f64, |a, &b| a.max(b));
    let exp_x = logits.mapv(|v| (v - max_x).exp());
    let denom = exp_x.sum() + (-max_x).exp();
    exp_x.mapv(|v| (1.0 - STATIONARITY_MARGIN) * v / denom)
}

/// Inverse of [`safe_softmax`].
///
/// Weights below `LOGIT_EPS` are clamped. If `Σ w` reaches the stationarity
/// bound, weights are shrunk proportionally so that the slack keeps at least
/// 1% of the mass.
pub fn safe_softmax_inv(weights: ArrayView1<f64>) -> Array1<f64> {
    let scale = 1.0 - STATIONARITY_MARGIN;
    let mut probs = weights.mapv(|w| (w / scale).max(LOGIT_EPS));
    let total = probs.sum();
    if total > 0.99 {
        probs.mapv_inplace(|p| p * 0.99 / total);
    }
    let slack = (1.0 - probs.sum()).max(LOGIT_EPS);
    probs.mapv(|p| p.ln() - slack.ln())
}

/// In-place `Jᵀ g` for the scaled softmax.
///
/// On entry `grad[j]` holds `∂ℓ/∂w_j`; on exit it holds `∂ℓ/∂x_j`, using
/// `∂w_i/∂x_j = w_i (δ_ij − w_j / (1 − STATIONARITY_MARGIN))`.
pub fn safe_softmax_deriv(weights: ArrayView1<f64>, grad: &mut ArrayViewMut1<f64>) {
    let scale = 1.0 - STATIONARITY_MARGIN;
    let weighted: f64 = weights.iter().zip(grad.iter()).map(|(w, g)| w * g).sum();
    for (g, &w) in grad.iter_mut().zip(weights.iter()) {
        *g = w * (*g - weighted / scale);
    }
}

/// Map unconstrained reals to stationary AR coefficients.
///
/// Each `raw_k` becomes a partial autocorrelation `r_k = tanh(raw_k)` and the
/// Durbin–Levinson recursion
/// `φ_j^{(k)} = φ_j^{(k−1)} − r_k φ_{k−j}^{(k−1)}`, `φ_k^{(k)} = r_k`
/// builds coefficients of `1 − Σ φ_i Lⁱ` with all roots outside the unit
/// circle.
pub fn pacf_to_coeffs(raw: ArrayView1<f64>) -> Array1<f64> {
    let p = raw.len();
    let mut phi = Array1::<f64>::zeros(p);
    let mut prev = Array1::<f64>::zeros(p);
    for k in 0..p {
        let r = raw[k].tanh();
        prev.assign(&phi);
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        phi[k] = r;
    }
    phi
}

/// Inverse of [`pacf_to_coeffs`].
///
/// Runs the Durbin–Levinson recursion backwards. Coefficients outside the
/// stationary region produce partial autocorrelations clamped just inside
/// `(-1, 1)`, so the result is always finite.
pub fn coeffs_to_pacf(coeffs: ArrayView1<f64>) -> Array1<f64> {
    let p = coeffs.len();
    let mut phi = coeffs.to_owned();
    let mut raw = Array1::<f64>::zeros(p);
    for k in (0..p).rev() {
        let r = phi[k].clamp(-PACF_CLAMP, PACF_CLAMP);
        raw[k] = r.atanh();
        let denom = 1.0 - r * r;
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = (prev[j] + r * prev[k - 1 - j]) / denom;
        }
    }
    raw
}

/// Delta-method covariance `G Σ Gᵀ`.
///
/// `jacobian` is `m × k` with rows indexed by model-space parameters and
/// columns by θ; `cov_theta` is the `k × k` θ-space covariance.
pub fn delta_method(cov_theta: &Array2<f64>, jacobian: &Array2<f64>) -> Array2<f64> {
    jacobian.dot(cov_theta).dot(&jacobian.t())
}
