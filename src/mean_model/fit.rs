//! Fitting an ARIMA specification and the resulting estimates.
//!
//! Standard errors use the Gauss–Newton approximation of the CSS problem,
//! `Cov(β̂) ≈ σ̂² (DᵀD)⁺` with `D = ∂e/∂β` in model-space coefficients, so no
//! transformation Jacobian is needed.
use crate::{
    comparison::{aic, bic},
    inference::{CoefRow, coef_table, pseudo_inverse, standard_errors},
    mean_model::{
        errors::{ArimaError, ArimaResult},
        model::{ArimaData, ArimaModel, ArmaCoeffs},
        spec::{ArimaSpec, difference},
    },
    optimization::{
        errors::OptError,
        loglik_optimizer::{LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize},
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use serde::Serialize;
use tracing::{debug, warn};

/// Estimated ARIMA model.
///
/// `residuals` start at index `resid_offset()` of the level series: the
/// first `d` observations are lost to differencing and the next `burn` to
/// conditioning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaFit {
    pub spec: ArimaSpec,
    pub constant: f64,
    pub ar: Array1<f64>,
    pub ma: Array1<f64>,
    pub sigma2: f64,
    pub loglik: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
    pub burn: usize,
    pub std_errors: Array1<f64>,
    pub residuals: Array1<f64>,
    pub outcome: OptimOutcome,
    #[serde(skip)]
    pub(crate) levels: Vec<f64>,
    #[serde(skip)]
    pub(crate) w: Array1<f64>,
    #[serde(skip)]
    pub(crate) e: Array1<f64>,
}

impl ArimaFit {
    /// Coefficients in optimizer order: `[c?, φ…, θ…]`.
    pub fn params(&self) -> Array1<f64> {
        let mut out = Vec::with_capacity(self.spec.n_coeffs());
        if self.spec.with_constant {
            out.push(self.constant);
        }
        out.extend(self.ar.iter().copied());
        out.extend(self.ma.iter().copied());
        Array1::from(out)
    }

    pub fn param_names(&self) -> Vec<String> {
        self.spec.coeff_names()
    }

    pub fn coef_table(&self) -> Vec<CoefRow> {
        let params = self.params();
        coef_table(
            &self.param_names(),
            params.as_slice().unwrap_or(&[]),
            self.std_errors.as_slice().unwrap_or(&[]),
        )
    }

    pub fn converged(&self) -> bool {
        self.outcome.converged
    }

    /// Index of the first residual in the level series.
    pub fn resid_offset(&self) -> usize {
        self.spec.order.d + self.burn
    }

    pub(crate) fn coeffs(&self) -> ArmaCoeffs {
        ArmaCoeffs { constant: self.constant, ar: self.ar.clone(), ma: self.ma.clone() }
    }
}

impl ArimaModel {
    /// Fit this specification to a level series by conditional least squares.
    ///
    /// `burn` is the number of differenced observations conditioned on; it
    /// defaults to `p` and is raised to `p` when smaller. Sharing one `burn`
    /// across candidates keeps their likelihoods on the same sample.
    ///
    /// # Errors
    /// - [`ArimaError::InvalidData`] / [`ArimaError::InsufficientData`] for
    ///   unusable input.
    /// - [`ArimaError::Optimization`] when no starting point converges to a
    ///   finite optimum.
    pub fn fit(
        &self, series: &[f64], burn: Option<usize>, opts: &MLEOptions,
    ) -> ArimaResult<ArimaFit> {
        if let Some((index, &value)) = series.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ArimaError::InvalidData { index, value });
        }
        let order = self.spec.order;
        let burn = burn.unwrap_or(order.p).max(order.p);
        let data = ArimaData::new(difference(series, order.d), burn)?;
        let n_eff = data.n_eff();
        let needed = self.spec.n_params() + 1;
        if n_eff < needed {
            return Err(ArimaError::InsufficientData { needed: needed + burn + order.d, found: series.len() });
        }

        let outcome = if self.spec.n_coeffs() == 0 {
            OptimOutcome::fixed(self.value(&Theta::zeros(0), &data)?)?
        } else {
            self.optimize(&data, opts)?
        };

        let coeffs = self.coeffs_from_theta(&outcome.theta_hat);
        let e = coeffs.residuals(data.w(), burn);
        let residuals = e.slice(s![burn..]).to_owned();
        let ssr = residuals.dot(&residuals);
        if !(ssr > 0.0 && ssr.is_finite()) {
            return Err(OptError::DegenerateResiduals { ssr }.into());
        }
        let sigma2 = ssr / n_eff as f64;
        let loglik = -0.5 * n_eff as f64 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let k = self.spec.n_params();

        let cov = gauss_newton_cov(&coeffs, data.w(), e.view(), burn, sigma2, self.spec.with_constant);
        let std_errors = standard_errors(&cov);

        if !outcome.converged {
            warn!(order = %order, status = %outcome.status, "ARIMA optimizer did not converge");
        }
        debug!(order = %order, loglik, sigma2, iterations = outcome.iterations, "fitted ARIMA");

        Ok(ArimaFit {
            spec: self.spec,
            constant: coeffs.constant,
            ar: coeffs.ar,
            ma: coeffs.ma,
            sigma2,
            loglik,
            aic: aic(loglik, k),
            bic: bic(loglik, k, n_eff),
            nobs: n_eff,
            burn,
            std_errors,
            residuals,
            outcome,
            levels: series.to_vec(),
            w: data.w().to_owned(),
            e,
        })
    }

    /// OLS start first; on failure retry from zero ARMA terms.
    fn optimize(&self, data: &ArimaData, opts: &MLEOptions) -> ArimaResult<OptimOutcome> {
        let theta0 = self.start_values(data);
        match maximize(self, theta0, data, opts) {
            Ok(outcome) => Ok(outcome),
            Err(first) => {
                debug!(order = %self.spec.order, error = %first, "retrying ARIMA fit from zero start");
                let mut theta1 = Theta::zeros(self.spec.n_coeffs());
                if self.spec.with_constant {
                    let tail = data.w().slice(s![data.burn()..]).to_owned();
                    theta1[0] = tail.sum() / tail.len() as f64;
                }
                maximize(self, theta1, data, opts).map_err(|_| ArimaError::Optimization(first))
            }
        }
    }
}

/// Fit `spec` to `series`; see [`ArimaModel::fit`].
pub fn fit_arima(
    series: &[f64], spec: ArimaSpec, burn: Option<usize>, opts: &MLEOptions,
) -> ArimaResult<ArimaFit> {
    ArimaModel::new(spec).fit(series, burn, opts)
}

/// `σ̂² (DᵀD)⁺` with `D_t = ∂e_t/∂(c, φ, θ)` from the recursions
/// `∂e_t/∂c = −1 − Σ θ_j ∂e_{t−j}/∂c`,
/// `∂e_t/∂φ_i = −w_{t−i} − Σ θ_j ∂e_{t−j}/∂φ_i`,
/// `∂e_t/∂θ_k = −e_{t−k} − Σ θ_j ∂e_{t−j}/∂θ_k`.
fn gauss_newton_cov(
    coeffs: &ArmaCoeffs, w: ArrayView1<f64>, e: ArrayView1<f64>, burn: usize, sigma2: f64,
    with_constant: bool,
) -> Array2<f64> {
    let (p, q) = (coeffs.ar.len(), coeffs.ma.len());
    let off = usize::from(with_constant);
    let k = off + p + q;
    let n = w.len();
    if k == 0 {
        return Array2::zeros((0, 0));
    }
    let mut de = Array2::<f64>::zeros((n, k));
    for t in burn..n {
        let mut row = Array1::<f64>::zeros(k);
        if with_constant {
            row[0] = -1.0;
        }
        for i in 0..p {
            row[off + i] = -w[t - 1 - i];
        }
        for j in 0..q {
            if let Some(lag) = t.checked_sub(j + 1) {
                row[off + p + j] = -e[lag];
                if lag >= burn {
                    row.scaled_add(-coeffs.ma[j], &de.row(lag));
                }
            }
        }
        de.row_mut(t).assign(&row);
    }
    let d = de.slice(s![burn.., ..]);
    pseudo_inverse(&d.t().dot(&d)) * sigma2
}
