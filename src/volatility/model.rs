//! GARCH-family likelihood with analytic scores.
//!
//! Variance recursion, for `t ≥ burn`:
//! `σ²_t = ω + Σα_i ε²_{t−i} + Σγ_j I[ε_{t−j}<0] ε²_{t−j} + Σβ_k σ²_{t−k}`.
//! Lags that fall before `burn` use the backcast `σ̄²` for `ε²` and `σ²`
//! and `½σ̄²` for the asymmetric term. The backcast is computed once from
//! the residuals of the starting mean and then held fixed, so it carries no
//! derivative.
//!
//! Scores are accumulated in model space by recursions for `∂σ²_t/∂η` and
//! `∂ε_t/∂η`, then mapped to θ with the Jacobian of
//! [`GarchParams::from_theta`]. The optimizer objective is the average
//! log-likelihood over the `n − burn` usable observations.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, LogLikelihood, Theta},
    },
    statistical_tests::ols::{OlsFit, design_from_columns},
    volatility::{
        errors::{GarchError, GarchResult},
        params::GarchParams,
        spec::{Distribution, GarchSpec, MeanSpec},
    },
};
use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use statrs::function::gamma::{digamma, ln_gamma};

/// Decay of the exponentially weighted backcast.
pub const BACKCAST_DECAY: f64 = 0.94;
/// Observations entering the backcast.
pub const BACKCAST_WINDOW: usize = 75;
/// Fewest observations left after conditioning on AR lags.
pub const MIN_EFFECTIVE_OBS: usize = 30;

/// Exponentially weighted mean of the first `min(75, n)` squared residuals.
pub fn backcast(resid: ArrayView1<f64>) -> f64 {
    let (mut num, mut den) = (0.0, 0.0);
    let mut w = 1.0;
    for e in resid.iter().take(BACKCAST_WINDOW) {
        num += w * e * e;
        den += w;
        w *= BACKCAST_DECAY;
    }
    if den > 0.0 { num / den } else { 0.0 }
}

/// Return series with its conditioning window and fixed backcast.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchData {
    y: Array1<f64>,
    burn: usize,
    backcast: f64,
}

impl GarchData {
    /// Validate `y` for `spec` and compute the backcast from the starting
    /// mean's residuals.
    ///
    /// # Errors
    /// - [`GarchError::InvalidData`] for non-finite returns.
    /// - [`GarchError::InsufficientData`] for too short a series.
    /// - [`GarchError::InvalidParameter`] when the residuals have no
    ///   variation (zero backcast).
    pub fn new(y: &[f64], spec: &GarchSpec) -> GarchResult<Self> {
        if let Some((index, &value)) = y.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(GarchError::InvalidData { index, value });
        }
        let burn = spec.mean.burn();
        let needed = burn + MIN_EFFECTIVE_OBS.max(2 * spec.n_params());
        if y.len() < needed {
            return Err(GarchError::InsufficientData { needed, found: y.len() });
        }
        let y = Array1::from(y.to_vec());
        let mean0 = start_mean(spec, y.view());
        let resid = mean_residuals(spec, mean0.view(), y.view(), burn);
        let bc = backcast(resid.slice(s![burn..]));
        if !(bc > 0.0 && bc.is_finite()) {
            return Err(GarchError::InvalidParameter {
                name: "backcast".to_string(),
                value: bc,
                reason: "residuals have no variation",
            });
        }
        Ok(GarchData { y, burn, backcast: bc })
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    pub fn burn(&self) -> usize {
        self.burn
    }

    pub fn backcast(&self) -> f64 {
        self.backcast
    }

    pub fn n_eff(&self) -> usize {
        self.y.len() - self.burn
    }
}

/// Mean coefficients to start from: sample mean or OLS AR fit.
pub fn start_mean(spec: &GarchSpec, y: ArrayView1<f64>) -> Array1<f64> {
    let mean = y.sum() / y.len() as f64;
    match spec.mean {
        MeanSpec::Zero => Array1::zeros(0),
        MeanSpec::Constant => Array1::from(vec![mean]),
        MeanSpec::Ar(k) => {
            let n = y.len();
            let mut columns = vec![vec![1.0; n - k]];
            for i in 1..=k {
                columns.push((k..n).map(|t| y[t - i]).collect());
            }
            let target = y.slice(s![k..]).to_vec();
            match OlsFit::fit(&target, &design_from_columns(&columns)) {
                Ok(ols) => ols.params,
                Err(_) => {
                    let mut out = Array1::zeros(k + 1);
                    out[0] = mean;
                    out
                }
            }
        }
    }
}

/// Conditional mean at `t` (requires `t ≥ burn`).
pub fn conditional_mean(spec: &GarchSpec, mean: ArrayView1<f64>, y: ArrayView1<f64>, t: usize) -> f64 {
    match spec.mean {
        MeanSpec::Zero => 0.0,
        MeanSpec::Constant => mean[0],
        MeanSpec::Ar(k) => mean[0] + (1..=k).map(|i| mean[i] * y[t - i]).sum::<f64>(),
    }
}

fn mean_residuals(spec: &GarchSpec, mean: ArrayView1<f64>, y: ArrayView1<f64>, burn: usize) -> Array1<f64> {
    let mut resid = Array1::zeros(y.len());
    for t in burn..y.len() {
        resid[t] = y[t] - conditional_mean(spec, mean, y, t);
    }
    resid
}

// ---- Lagged terms with backcast pre-sample values ----

fn lag_index(t: usize, lag: usize, burn: usize) -> Option<usize> {
    t.checked_sub(lag).filter(|&s| s >= burn)
}

fn shock_sq(resid: &Array1<f64>, t: usize, lag: usize, burn: usize, bc: f64) -> f64 {
    lag_index(t, lag, burn).map_or(bc, |s| resid[s] * resid[s])
}

fn neg_shock_sq(resid: &Array1<f64>, t: usize, lag: usize, burn: usize, bc: f64) -> f64 {
    lag_index(t, lag, burn).map_or(0.5 * bc, |s| if resid[s] < 0.0 { resid[s] * resid[s] } else { 0.0 })
}

fn lagged_var(sigma2: &Array1<f64>, t: usize, lag: usize, burn: usize, bc: f64) -> f64 {
    lag_index(t, lag, burn).map_or(bc, |s| sigma2[s])
}

/// Log-density of the standardized innovation and its partial derivatives.
struct Density {
    dist: Distribution,
    nu: f64,
    log_const: f64,
    dnu_const: f64,
}

impl Density {
    fn new(dist: Distribution, nu: Option<f64>) -> Self {
        match (dist, nu) {
            (Distribution::StudentT, Some(nu)) => Density {
                dist,
                nu,
                log_const: ln_gamma(0.5 * (nu + 1.0))
                    - ln_gamma(0.5 * nu)
                    - 0.5 * (std::f64::consts::PI * (nu - 2.0)).ln(),
                dnu_const: 0.5 * digamma(0.5 * (nu + 1.0)) - 0.5 * digamma(0.5 * nu) - 0.5 / (nu - 2.0),
            },
            _ => Density {
                dist: Distribution::Normal,
                nu: f64::INFINITY,
                log_const: -0.5 * (2.0 * std::f64::consts::PI).ln(),
                dnu_const: 0.0,
            },
        }
    }

    fn loglik(&self, eps: f64, s2: f64) -> f64 {
        match self.dist {
            Distribution::Normal => self.log_const - 0.5 * (s2.ln() + eps * eps / s2),
            Distribution::StudentT => {
                let x = eps * eps / (s2 * (self.nu - 2.0));
                self.log_const - 0.5 * s2.ln() - 0.5 * (self.nu + 1.0) * x.ln_1p()
            }
        }
    }

    /// `(∂ℓ/∂σ², ∂ℓ/∂ε, ∂ℓ/∂ν)` for one observation.
    fn partials(&self, eps: f64, s2: f64) -> (f64, f64, f64) {
        match self.dist {
            Distribution::Normal => (0.5 * (eps * eps / s2 - 1.0) / s2, -eps / s2, 0.0),
            Distribution::StudentT => {
                let nu = self.nu;
                let x = eps * eps / (s2 * (nu - 2.0));
                let ratio = x / (1.0 + x);
                let d_s2 = (-0.5 + 0.5 * (nu + 1.0) * ratio) / s2;
                let d_eps = -(nu + 1.0) * eps / (s2 * (nu - 2.0) * (1.0 + x));
                let d_nu = self.dnu_const - 0.5 * x.ln_1p() + 0.5 * (nu + 1.0) * ratio / (nu - 2.0);
                (d_s2, d_eps, d_nu)
            }
        }
    }
}

/// Residuals and conditional variances; entries before `burn` hold zero
/// and the backcast respectively.
#[derive(Debug, Clone, PartialEq)]
pub struct VariancePath {
    pub resid: Array1<f64>,
    pub sigma2: Array1<f64>,
}

/// Likelihood of a [`GarchSpec`]; implements [`LogLikelihood`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchModel {
    pub spec: GarchSpec,
}

impl GarchModel {
    pub fn new(spec: GarchSpec) -> Self {
        GarchModel { spec }
    }

    /// Run the mean and variance recursions.
    ///
    /// # Errors
    /// - [`OptError::NonPositiveVariance`] if some `σ²_t` is not finite and
    ///   positive.
    pub fn filter(&self, params: &GarchParams, data: &GarchData) -> OptResult<VariancePath> {
        let y = data.y();
        let (burn, bc) = (data.burn(), data.backcast());
        let n = y.len();
        let mut resid = Array1::<f64>::zeros(n);
        let mut sigma2 = Array1::<f64>::from_elem(n, bc);
        for t in burn..n {
            let mut s2 = params.omega;
            for (i, a) in params.alpha.iter().enumerate() {
                s2 += a * shock_sq(&resid, t, i + 1, burn, bc);
            }
            for (j, g) in params.gamma.iter().enumerate() {
                s2 += g * neg_shock_sq(&resid, t, j + 1, burn, bc);
            }
            for (k, b) in params.beta.iter().enumerate() {
                s2 += b * lagged_var(&sigma2, t, k + 1, burn, bc);
            }
            if !(s2 > 0.0 && s2.is_finite()) {
                return Err(OptError::NonPositiveVariance { index: t, value: s2 });
            }
            sigma2[t] = s2;
            resid[t] = y[t] - conditional_mean(&self.spec, params.mean.view(), y, t);
        }
        Ok(VariancePath { resid, sigma2 })
    }

    /// Total (not average) log-likelihood at model-space parameters.
    pub fn loglik(&self, params: &GarchParams, data: &GarchData) -> OptResult<f64> {
        let path = self.filter(params, data)?;
        let density = Density::new(self.spec.dist, params.nu);
        let total: f64 = (data.burn()..path.resid.len())
            .map(|t| density.loglik(path.resid[t], path.sigma2[t]))
            .sum();
        if !total.is_finite() {
            return Err(OptError::NonFiniteCost { value: total });
        }
        Ok(total)
    }

    /// Per-observation scores in model space, `n_eff × k`.
    pub fn model_scores(&self, params: &GarchParams, data: &GarchData) -> OptResult<Array2<f64>> {
        let spec = &self.spec;
        let y = data.y();
        let (burn, bc) = (data.burn(), data.backcast());
        let n = y.len();
        let (p, o, q) = (spec.vol.p(), spec.vol.o(), spec.vol.q());
        let m = spec.n_mean();
        let kv = m + 1 + p + o + q;

        let path = self.filter(params, data)?;
        let (resid, sigma2) = (&path.resid, &path.sigma2);
        let density = Density::new(spec.dist, params.nu);
        let mut dsig = Array2::<f64>::zeros((n, kv));
        let mut deps = Array2::<f64>::zeros((n, m));
        let mut scores = Array2::<f64>::zeros((n - burn, spec.n_params()));

        for t in burn..n {
            let mut de = Array1::<f64>::zeros(m);
            match spec.mean {
                MeanSpec::Zero => {}
                MeanSpec::Constant => de[0] = -1.0,
                MeanSpec::Ar(k) => {
                    de[0] = -1.0;
                    for i in 1..=k {
                        de[i] = -y[t - i];
                    }
                }
            }
            deps.row_mut(t).assign(&de);

            let mut ds = Array1::<f64>::zeros(kv);
            ds[m] = 1.0;
            for i in 0..p {
                ds[m + 1 + i] = shock_sq(resid, t, i + 1, burn, bc);
                if let Some(s) = lag_index(t, i + 1, burn) {
                    ds.slice_mut(s![..m]).scaled_add(2.0 * params.alpha[i] * resid[s], &deps.row(s));
                }
            }
            for j in 0..o {
                ds[m + 1 + p + j] = neg_shock_sq(resid, t, j + 1, burn, bc);
                if let Some(s) = lag_index(t, j + 1, burn) {
                    if resid[s] < 0.0 {
                        ds.slice_mut(s![..m]).scaled_add(2.0 * params.gamma[j] * resid[s], &deps.row(s));
                    }
                }
            }
            for k in 0..q {
                ds[m + 1 + p + o + k] = lagged_var(sigma2, t, k + 1, burn, bc);
                if let Some(s) = lag_index(t, k + 1, burn) {
                    ds.scaled_add(params.beta[k], &dsig.row(s));
                }
            }
            dsig.row_mut(t).assign(&ds);

            let (d_s2, d_eps, d_nu) = density.partials(resid[t], sigma2[t]);
            let mut row = scores.row_mut(t - burn);
            row.slice_mut(s![..kv]).assign(&(&ds * d_s2));
            row.slice_mut(s![..m]).scaled_add(d_eps, &de);
            if let Some(ni) = spec.nu_idx() {
                row[ni] = d_nu;
            }
        }
        Ok(scores)
    }

    /// Per-observation scores in θ space, `n_eff × k`.
    pub fn theta_scores(&self, theta: &Theta, data: &GarchData) -> OptResult<Array2<f64>> {
        let params = GarchParams::from_theta(&self.spec, theta.view());
        let jac = GarchParams::jacobian(&self.spec, theta.view());
        Ok(self.model_scores(&params, data)?.dot(&jac))
    }
}

impl LogLikelihood for GarchModel {
    type Data = GarchData;

    /// Average log-likelihood `ℓ(θ) / n_eff`.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        let params = GarchParams::from_theta(&self.spec, theta.view());
        Ok(self.loglik(&params, data)? / data.n_eff() as f64)
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        let expected = self.spec.n_params();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        if data.burn() != self.spec.mean.burn() {
            return Err(OptError::InsufficientObservations {
                needed: self.spec.mean.burn(),
                found: data.burn(),
            });
        }
        if data.n_eff() <= expected {
            return Err(OptError::InsufficientObservations { needed: expected + 1, found: data.n_eff() });
        }
        Ok(())
    }

    /// Analytic `∇ℓ(θ) / n_eff`: model-space score sum mapped through the
    /// Jacobian of the θ map.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let params = GarchParams::from_theta(&self.spec, theta.view());
        let jac = GarchParams::jacobian(&self.spec, theta.view());
        let g_model = self.model_scores(&params, data)?.sum_axis(Axis(0)) / data.n_eff() as f64;
        Ok(jac.t().dot(&g_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        optimization::loglik_optimizer::finite_diff::fd_gradient,
        volatility::spec::VolatilitySpec,
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The backcast weights.
    // - A hand-computed GJR variance recursion with backcast start.
    // - Analytic gradients against finite differences for every mean
    //   specification and both innovation laws.
    // - Scores that average to the gradient.
    // -------------------------------------------------------------------------

    fn returns() -> Vec<f64> {
        (0..120).map(|t| ((t * 37 % 23) as f64 - 11.0) / 7.0 + 0.02 * (t % 5) as f64).collect()
    }

    #[test]
    // Purpose
    // -------
    // The backcast is the 0.94-weighted mean of squared residuals.
    //
    // Given
    // -----
    // - Residuals 1, 2.
    //
    // Expect
    // ------
    // - (1 + 0.94·4) / 1.94.
    fn backcast_weights_decay() {
        assert_relative_eq!(backcast(array![1.0, 2.0].view()), (1.0 + 0.94 * 4.0) / 1.94, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // The first two variance steps follow the recursion by hand.
    //
    // Given
    // -----
    // - Zero mean, GJR(1,1,1) with ω = 0.1, α = 0.1, γ = 0.2, β = 0.6.
    // - y = (−1, 2, …), backcast b.
    //
    // Expect
    // ------
    // - σ²₀ = ω + αb + γ·½b + βb; σ²₁ = ω + α + γ + βσ²₀.
    fn gjr_recursion_matches_hand_computation() {
        // Arrange
        let spec = GarchSpec::new(
            MeanSpec::Zero,
            VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 },
            Distribution::Normal,
        )
        .unwrap();
        let mut y = returns();
        y[0] = -1.0;
        y[1] = 2.0;
        let data = GarchData::new(&y, &spec).unwrap();
        let params = GarchParams::new(&spec, Array1::zeros(0), 0.1, array![0.1], array![0.2], array![0.6], None).unwrap();
        let b = data.backcast();

        // Act
        let path = GarchModel::new(spec).filter(&params, &data).unwrap();

        // Assert
        let s0 = 0.1 + 0.1 * b + 0.2 * 0.5 * b + 0.6 * b;
        assert_relative_eq!(path.sigma2[0], s0, epsilon = 1e-12);
        assert_relative_eq!(path.sigma2[1], 0.1 + 0.1 + 0.2 + 0.6 * s0, epsilon = 1e-12);
        assert_eq!(path.resid[1], 2.0);
    }

    fn check_gradient(spec: GarchSpec, params: GarchParams) {
        let data = GarchData::new(&returns(), &spec).unwrap();
        let model = GarchModel::new(spec);
        let theta = params.to_theta(&spec);

        let analytic = model.grad(&theta, &data).unwrap();
        let numeric = fd_gradient(&|th: &Theta| model.value(th, &data), &theta).unwrap();

        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(a, n, epsilon = 1e-5, max_relative = 1e-4);
        }
    }

    #[test]
    // Purpose
    // -------
    // Analytic gradient of GJR-GARCH with constant mean and t innovations.
    //
    // Given
    // -----
    // - μ = 0.1, ω = 0.3, α = 0.05, γ = 0.1, β = 0.8, ν = 6.
    //
    // Expect
    // ------
    // - Agreement with central differences.
    fn gradient_matches_fd_gjr_student_t() {
        let spec = GarchSpec::new(
            MeanSpec::Constant,
            VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 },
            Distribution::StudentT,
        )
        .unwrap();
        let params =
            GarchParams::new(&spec, array![0.1], 0.3, array![0.05], array![0.1], array![0.8], Some(6.0))
                .unwrap();

        check_gradient(spec, params);
    }

    #[test]
    // Purpose
    // -------
    // Analytic gradient of GARCH(1,1) with an AR(1) mean, Normal errors.
    //
    // Given
    // -----
    // - c = 0.05, φ = 0.2, ω = 0.2, α = 0.1, β = 0.85.
    //
    // Expect
    // ------
    // - Agreement with central differences, including the mean terms that
    //   feed the variance.
    fn gradient_matches_fd_ar_mean_normal() {
        let spec = GarchSpec::new(MeanSpec::Ar(1), VolatilitySpec::Garch { p: 1, q: 1 }, Distribution::Normal)
            .unwrap();
        let params =
            GarchParams::new(&spec, array![0.05, 0.2], 0.2, array![0.1], Array1::zeros(0), array![0.85], None).unwrap();

        check_gradient(spec, params);
    }

    #[test]
    // Purpose
    // -------
    // Scores average to the gradient.
    //
    // Given
    // -----
    // - GARCH(1,1), constant mean, Normal.
    //
    // Expect
    // ------
    // - Column means of the θ-scores equal `grad`.
    fn scores_average_to_gradient() {
        // Arrange
        let spec = GarchSpec::new(MeanSpec::Constant, VolatilitySpec::Garch { p: 1, q: 1 }, Distribution::Normal)
            .unwrap();
        let data = GarchData::new(&returns(), &spec).unwrap();
        let model = GarchModel::new(spec);
        let params =
            GarchParams::new(&spec, array![0.0], 0.2, array![0.1], Array1::zeros(0), array![0.8], None).unwrap();
        let theta = params.to_theta(&spec);

        // Act
        let scores = model.theta_scores(&theta, &data).unwrap();
        let grad = model.grad(&theta, &data).unwrap();

        // Assert
        assert_eq!(scores.nrows(), data.n_eff());
        let means = scores.mean_axis(Axis(0)).unwrap();
        for (a, b) in means.iter().zip(grad.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Data validation.
    //
    // Given
    // -----
    // - A NaN return; 10 returns; 100 equal returns.
    //
    // Expect
    // ------
    // - `InvalidData`, `InsufficientData`, `InvalidParameter`.
    fn data_validation() {
        let spec = GarchSpec::new(MeanSpec::Constant, VolatilitySpec::Garch { p: 1, q: 1 }, Distribution::Normal)
            .unwrap();
        let mut bad = returns();
        bad[4] = f64::NAN;

        assert!(matches!(GarchData::new(&bad, &spec), Err(GarchError::InvalidData { index: 4, .. })));
        assert!(matches!(GarchData::new(&[1.0; 10], &spec), Err(GarchError::InsufficientData { .. })));
        assert!(matches!(GarchData::new(&[1.0; 100], &spec), Err(GarchError::InvalidParameter { .. })));
    }
}
