//! ARMA conditional sum-of-squares likelihood on a differenced series.
//!
//! For `w_t` (the `d`-times differenced series) the model is
//! `w_t = c + Σ φ_i w_{t−i} + e_t + Σ θ_j e_{t−j}` with Gaussian `e_t`.
//! Conditioning on the first `burn ≥ p` observations and setting pre-sample
//! errors to zero gives residuals `e_t` for `t ≥ burn`. With `σ²`
//! concentrated out (`σ̂² = SSR / n_eff`) the log-likelihood is
//! `ℓ = −(n_eff/2) (ln(2π σ̂²) + 1)`; the optimizer sees `ℓ / n_eff`.
//!
//! The gradient is left to the optimizer's finite-difference fallback: the
//! objective is smooth in θ and cheap to evaluate.
use crate::{
    mean_model::{
        errors::{ArimaError, ArimaResult},
        spec::ArimaSpec,
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, Theta},
        numerical_stability::transformations::{coeffs_to_pacf, pacf_to_coeffs},
    },
    statistical_tests::ols::{OlsFit, design_from_columns},
};
use ndarray::{Array1, ArrayView1, s};

/// Fewest observations left after conditioning.
pub const MIN_EFFECTIVE_OBS: usize = 10;

/// Differenced series plus the conditioning window.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaData {
    w: Array1<f64>,
    burn: usize,
}

impl ArimaData {
    /// # Errors
    /// - [`ArimaError::InvalidData`] for non-finite values.
    /// - [`ArimaError::InsufficientData`] when fewer than
    ///   [`MIN_EFFECTIVE_OBS`] observations follow the burn-in.
    pub fn new(w: Vec<f64>, burn: usize) -> ArimaResult<Self> {
        if let Some((index, &value)) = w.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ArimaError::InvalidData { index, value });
        }
        let needed = burn + MIN_EFFECTIVE_OBS;
        if w.len() < needed {
            return Err(ArimaError::InsufficientData { needed, found: w.len() });
        }
        Ok(ArimaData { w: Array1::from(w), burn })
    }

    pub fn w(&self) -> ArrayView1<'_, f64> {
        self.w.view()
    }

    pub fn burn(&self) -> usize {
        self.burn
    }

    /// Observations entering the likelihood.
    pub fn n_eff(&self) -> usize {
        self.w.len() - self.burn
    }
}

/// Model-space ARMA coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmaCoeffs {
    pub constant: f64,
    pub ar: Array1<f64>,
    pub ma: Array1<f64>,
}

impl ArmaCoeffs {
    /// Conditional residuals, zero before `burn`.
    pub fn residuals(&self, w: ArrayView1<f64>, burn: usize) -> Array1<f64> {
        let n = w.len();
        let mut e = Array1::<f64>::zeros(n);
        for t in burn..n {
            let mut v = w[t] - self.constant;
            for (i, phi) in self.ar.iter().enumerate() {
                v -= phi * w[t - 1 - i];
            }
            for (j, theta) in self.ma.iter().enumerate() {
                if let Some(lag) = t.checked_sub(j + 1) {
                    v -= theta * e[lag];
                }
            }
            e[t] = v;
        }
        e
    }
}

/// CSS likelihood of an [`ArimaSpec`]; implements [`LogLikelihood`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArimaModel {
    pub spec: ArimaSpec,
}

impl ArimaModel {
    pub fn new(spec: ArimaSpec) -> Self {
        ArimaModel { spec }
    }

    /// θ → `(c, φ, θ_MA)`; φ via the PACF map, `θ_MA = −pacf_to_coeffs(raw)`.
    pub fn coeffs_from_theta(&self, theta: &Theta) -> ArmaCoeffs {
        let (p, q) = (self.spec.order.p, self.spec.order.q);
        let off = usize::from(self.spec.with_constant);
        let constant = if self.spec.with_constant { theta[0] } else { 0.0 };
        let ar = pacf_to_coeffs(theta.slice(s![off..off + p]));
        let ma = -pacf_to_coeffs(theta.slice(s![off + p..off + p + q]));
        ArmaCoeffs { constant, ar, ma }
    }

    /// Inverse of [`coeffs_from_theta`](Self::coeffs_from_theta); coefficients
    /// outside the admissible region are pulled just inside it.
    pub fn theta_from_coeffs(&self, coeffs: &ArmaCoeffs) -> Theta {
        let mut theta = Vec::with_capacity(self.spec.n_coeffs());
        if self.spec.with_constant {
            theta.push(coeffs.constant);
        }
        theta.extend(coeffs_to_pacf(coeffs.ar.view()).iter().copied());
        theta.extend(coeffs_to_pacf((-&coeffs.ma).view()).iter().copied());
        Array1::from(theta)
    }

    /// Starting point: OLS AR(p) on the conditioning sample, zero MA terms.
    pub fn start_values(&self, data: &ArimaData) -> Theta {
        let (p, q) = (self.spec.order.p, self.spec.order.q);
        let w = data.w();
        let burn = data.burn();
        let n = w.len();
        let tail = w.slice(s![burn..]);
        let mut coeffs = ArmaCoeffs {
            constant: tail.sum() / tail.len() as f64,
            ar: Array1::zeros(p),
            ma: Array1::zeros(q),
        };
        if p > 0 {
            let mut columns = Vec::with_capacity(p + 1);
            if self.spec.with_constant {
                columns.push(vec![1.0; n - burn]);
            }
            for i in 1..=p {
                columns.push((burn..n).map(|t| w[t - i]).collect());
            }
            if let Ok(ols) = OlsFit::fit(&tail.to_vec(), &design_from_columns(&columns)) {
                let off = usize::from(self.spec.with_constant);
                if self.spec.with_constant {
                    coeffs.constant = ols.params[0];
                }
                coeffs.ar = ols.params.slice(s![off..]).to_owned();
            }
        }
        if !self.spec.with_constant {
            coeffs.constant = 0.0;
        }
        self.theta_from_coeffs(&coeffs)
    }

    /// Sum of squared residuals over the likelihood window.
    pub fn ssr(&self, coeffs: &ArmaCoeffs, data: &ArimaData) -> f64 {
        let e = coeffs.residuals(data.w(), data.burn());
        let tail = e.slice(s![data.burn()..]);
        tail.dot(&tail)
    }
}

impl LogLikelihood for ArimaModel {
    type Data = ArimaData;

    /// Average concentrated log-likelihood `−½ (ln(2π SSR/n_eff) + 1)`.
    ///
    /// # Errors
    /// - [`OptError::DegenerateResiduals`] when the SSR is zero or not
    ///   finite.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        let coeffs = self.coeffs_from_theta(theta);
        let ssr = self.ssr(&coeffs, data);
        if !(ssr > 0.0 && ssr.is_finite()) {
            return Err(OptError::DegenerateResiduals { ssr });
        }
        let sigma2 = ssr / data.n_eff() as f64;
        Ok(-0.5 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0))
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        let expected = self.spec.n_coeffs();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        if data.burn() < self.spec.order.p {
            return Err(OptError::InsufficientObservations {
                needed: self.spec.order.p,
                found: data.burn(),
            });
        }
        let needed = self.spec.n_params() + 1;
        if data.n_eff() < needed {
            return Err(OptError::InsufficientObservations { needed, found: data.n_eff() });
        }
        Ok(())
    }
}
