//! Model-space GARCH parameters and their optimizer-space mapping.
//!
//! Mapping conventions
//! -------------------
//! - Mean coefficients are unconstrained and enter θ unchanged.
//! - `θ_ω = softplus⁻¹(ω)` keeps `ω > 0`.
//! - The lag weights `(α, γ/2, β)` are a scaled softmax of their logits with
//!   an implicit slack, so `α, γ, β ≥ 0` and the persistence
//!   `Σα + ½Σγ + Σβ < 1 − STATIONARITY_MARGIN` for every θ.
//! - `ν = NU_FLOOR + softplus(θ_ν)` keeps the Student-t variance finite.
use crate::{
    optimization::{
        loglik_optimizer::Theta,
        numerical_stability::transformations::{
            STATIONARITY_MARGIN, safe_logistic, safe_softmax, safe_softmax_deriv, safe_softmax_inv,
            safe_softplus, safe_softplus_inv,
        },
    },
    volatility::{
        errors::{GarchError, GarchResult},
        spec::GarchSpec,
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use serde::Serialize;

/// Lower bound of the Student-t degrees of freedom.
pub const NU_FLOOR: f64 = 2.05;
/// Smallest `ω` mapped back into θ.
const OMEGA_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GarchParams {
    /// Mean coefficients: `[]`, `[μ]` or `[c, φ₁, …]`.
    pub mean: Array1<f64>,
    pub omega: f64,
    pub alpha: Array1<f64>,
    pub gamma: Array1<f64>,
    pub beta: Array1<f64>,
    pub nu: Option<f64>,
}

impl GarchParams {
    /// Validated model-space parameters.
    ///
    /// # Errors
    /// - [`GarchError::ParamLength`] if block lengths disagree with `spec`.
    /// - [`GarchError::InvalidParameter`] for `ω ≤ 0`, negative lag
    ///   coefficients, persistence `≥ 1`, or `ν ≤ 2`.
    pub fn new(
        spec: &GarchSpec, mean: Array1<f64>, omega: f64, alpha: Array1<f64>, gamma: Array1<f64>,
        beta: Array1<f64>, nu: Option<f64>,
    ) -> GarchResult<Self> {
        let expected = spec.n_params();
        let actual = mean.len()
            + 1
            + alpha.len()
            + gamma.len()
            + beta.len()
            + usize::from(nu.is_some());
        if actual != expected
            || mean.len() != spec.n_mean()
            || alpha.len() != spec.vol.p()
            || gamma.len() != spec.vol.o()
            || beta.len() != spec.vol.q()
            || nu.is_some() != spec.nu_idx().is_some()
        {
            return Err(GarchError::ParamLength { expected, actual });
        }
        if !(omega > 0.0 && omega.is_finite()) {
            return Err(invalid("omega", omega, "must be finite and > 0"));
        }
        for (name, block) in [("alpha", &alpha), ("gamma", &gamma), ("beta", &beta)] {
            if let Some(&v) = block.iter().find(|v| !(**v >= 0.0 && v.is_finite())) {
                return Err(invalid(name, v, "must be finite and >= 0"));
            }
        }
        if let Some(&v) = mean.iter().find(|v| !v.is_finite()) {
            return Err(invalid("mean", v, "must be finite"));
        }
        if let Some(v) = nu {
            if !(v > 2.0 && v.is_finite()) {
                return Err(invalid("nu", v, "must be finite and > 2"));
            }
        }
        let params = GarchParams { mean, omega, alpha, gamma, beta, nu };
        let persistence = params.persistence();
        if persistence >= 1.0 {
            return Err(invalid("persistence", persistence, "must be < 1"));
        }
        Ok(params)
    }

    /// `Σα + ½Σγ + Σβ`.
    pub fn persistence(&self) -> f64 {
        self.alpha.sum() + 0.5 * self.gamma.sum() + self.beta.sum()
    }

    /// `ω / (1 − persistence)`.
    pub fn unconditional_variance(&self) -> f64 {
        self.omega / (1.0 - self.persistence())
    }

    /// Steps for a variance shock to decay by half: `ln ½ / ln(persistence)`.
    pub fn half_life(&self) -> f64 {
        let pers = self.persistence();
        if pers <= 0.0 { 0.0 } else { 0.5_f64.ln() / pers.ln() }
    }

    /// Model-space vector in the layout of [`GarchSpec::param_names`].
    pub fn to_vec(&self) -> Array1<f64> {
        let mut out: Vec<f64> = self.mean.to_vec();
        out.push(self.omega);
        out.extend(self.alpha.iter().chain(&self.gamma).chain(&self.beta).copied());
        out.extend(self.nu);
        Array1::from(out)
    }

    /// Map an optimizer vector to model space. Admissible by construction.
    pub fn from_theta(spec: &GarchSpec, theta: ArrayView1<f64>) -> Self {
        let (p, o) = (spec.vol.p(), spec.vol.o());
        let m = spec.n_mean();
        let wi = spec.weights_idx();
        let weights = safe_softmax(theta.slice(s![wi..wi + spec.n_weights()]));
        GarchParams {
            mean: theta.slice(s![..m]).to_owned(),
            omega: safe_softplus(theta[spec.omega_idx()]),
            alpha: weights.slice(s![..p]).to_owned(),
            gamma: weights.slice(s![p..p + o]).mapv(|w| 2.0 * w),
            beta: weights.slice(s![p + o..]).to_owned(),
            nu: spec.nu_idx().map(|i| NU_FLOOR + safe_softplus(theta[i])),
        }
    }

    /// Inverse of [`from_theta`](Self::from_theta). Values on the boundary
    /// (zero weights, persistence at the bound) are pulled inside.
    pub fn to_theta(&self, spec: &GarchSpec) -> Theta {
        let mut theta: Vec<f64> = self.mean.to_vec();
        theta.push(safe_softplus_inv(self.omega.max(OMEGA_FLOOR)));
        let weights: Array1<f64> = self
            .alpha
            .iter()
            .copied()
            .chain(self.gamma.iter().map(|g| 0.5 * g))
            .chain(self.beta.iter().copied())
            .collect();
        theta.extend(safe_softmax_inv(weights.view()).iter().copied());
        if spec.nu_idx().is_some() {
            let nu = self.nu.unwrap_or(8.0);
            theta.push(safe_softplus_inv((nu - NU_FLOOR).max(1e-6)));
        }
        Array1::from(theta)
    }

    /// Jacobian `∂(model params)/∂θ` in the shared layout.
    pub fn jacobian(spec: &GarchSpec, theta: ArrayView1<f64>) -> Array2<f64> {
        let k = spec.n_params();
        let mut jac = Array2::<f64>::zeros((k, k));
        for i in 0..spec.n_mean() {
            jac[[i, i]] = 1.0;
        }
        let oi = spec.omega_idx();
        jac[[oi, oi]] = safe_logistic(theta[oi]);

        let (p, o) = (spec.vol.p(), spec.vol.o());
        let wi = spec.weights_idx();
        let nw = spec.n_weights();
        let weights = safe_softmax(theta.slice(s![wi..wi + nw]));
        for r in 0..nw {
            // Row r of the softmax Jacobian is Jᵀ e_r by symmetry.
            let mut row = Array1::<f64>::zeros(nw);
            row[r] = 1.0;
            safe_softmax_deriv(weights.view(), &mut row.view_mut());
            let scale = if r >= p && r < p + o { 2.0 } else { 1.0 };
            jac.slice_mut(s![wi + r, wi..wi + nw]).assign(&(row * scale));
        }
        if let Some(ni) = spec.nu_idx() {
            jac[[ni, ni]] = safe_logistic(theta[ni]);
        }
        jac
    }

    /// Slack left below the stationarity bound.
    pub fn slack(&self) -> f64 {
        1.0 - STATIONARITY_MARGIN - self.persistence()
    }
}

fn invalid(name: &str, value: f64, reason: &'static str) -> GarchError {
    GarchError::InvalidParameter { name: name.to_string(), value, reason }
}
