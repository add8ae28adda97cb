//! Maximum-likelihood fitting of GARCH-family models.
//!
//! Procedure
//! ---------
//! 1. Build [`GarchData`] (validation, backcast).
//! 2. Evaluate a grid of starting points (α, γ, persistence) with `ω`
//!    targeting the sample variance; keep the best few.
//! 3. Run `maximize` from the best start, falling back to the next ones on
//!    failure.
//! 4. Re-centre `θ̂` through the model-space map and restart while the
//!    log-likelihood improves. Softmax logits that drift far out flatten the
//!    gradient without reaching an optimum; re-centring pulls them back.
//! 5. Student-t only: also restart from the Normal estimate with `ν` near
//!    the Normal limit whenever that point beats the current optimum, so
//!    `ℓ_t` never falls materially below the nested Normal fit.
//! 6. Standard errors: observed information from finite differences of the
//!    analytic gradient. Classical `J⁺/n`; robust (Bollerslev–Wooldridge)
//!    `J⁺ S J⁺ / n` with `S` the score covariance. Both are mapped to model
//!    space with the delta method.
use crate::{
    comparison::{ModelEntry, aic, bic},
    inference::{
        CoefRow, HACOptions, calc_covariance, calculate_avg_scores_cov, coef_table, standard_errors,
    },
    optimization::{
        errors::OptError,
        loglik_optimizer::{Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize},
        numerical_stability::transformations::delta_method,
    },
    volatility::{
        errors::{GarchError, GarchResult},
        model::{GarchData, GarchModel, conditional_mean, start_mean},
        params::GarchParams,
        spec::{Distribution, GarchSpec},
    },
};
use ndarray::{Array1, s};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Starting points tried before giving up.
const MAX_START_ATTEMPTS: usize = 3;
/// Degrees of freedom at the start of a Student-t fit.
const NU_START: f64 = 8.0;
/// Degrees of freedom standing in for the Normal limit.
const NU_NEAR_NORMAL: f64 = 200.0;
/// Re-centred restarts after the first optimum.
const MAX_REFINE_ROUNDS: usize = 4;
/// Average log-likelihood gain that counts as an improvement.
const REFINE_TOL: f64 = 1e-9;
/// Slack below the stationarity bound under which a fit counts as stuck on it.
pub const BOUND_SLACK: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchFitOptions {
    #[serde(skip)]
    pub mle_opts: MLEOptions,
    /// Score covariance used by the robust standard errors.
    pub hac: HACOptions,
}

impl Default for GarchFitOptions {
    fn default() -> Self {
        GarchFitOptions { mle_opts: MLEOptions::default(), hac: HACOptions::default() }
    }
}

/// Estimated GARCH-family model.
///
/// Series fields (`residuals`, `conditional_variance`, `std_resid`) start
/// after the `burn` observations used as AR lags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GarchFit {
    pub spec: GarchSpec,
    pub params: GarchParams,
    pub loglik: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
    pub std_errors: Array1<f64>,
    pub robust_std_errors: Array1<f64>,
    pub residuals: Array1<f64>,
    pub conditional_variance: Array1<f64>,
    pub std_resid: Array1<f64>,
    pub outcome: OptimOutcome,
    #[serde(skip)]
    pub(crate) y: Array1<f64>,
    #[serde(skip)]
    pub(crate) backcast: f64,
}

impl GarchFit {
    pub fn param_names(&self) -> Vec<String> {
        self.spec.param_names()
    }

    pub fn param_values(&self) -> Array1<f64> {
        self.params.to_vec()
    }

    /// Coefficient table with classical standard errors.
    pub fn coef_table(&self) -> Vec<CoefRow> {
        self.table(&self.std_errors)
    }

    /// Coefficient table with robust standard errors.
    pub fn robust_coef_table(&self) -> Vec<CoefRow> {
        self.table(&self.robust_std_errors)
    }

    fn table(&self, se: &Array1<f64>) -> Vec<CoefRow> {
        let values = self.param_values();
        coef_table(&self.param_names(), &values.to_vec(), &se.to_vec())
    }

    pub fn persistence(&self) -> f64 {
        self.params.persistence()
    }

    pub fn half_life(&self) -> f64 {
        self.params.half_life()
    }

    pub fn unconditional_variance(&self) -> f64 {
        self.params.unconditional_variance()
    }

    pub fn conditional_volatility(&self) -> Array1<f64> {
        self.conditional_variance.mapv(f64::sqrt)
    }

    /// Optimizer met its tolerance and the estimate is off the
    /// stationarity bound.
    pub fn converged(&self) -> bool {
        self.outcome.converged && !self.on_stationarity_bound()
    }

    /// Persistence within [`BOUND_SLACK`] of the stationarity bound.
    pub fn on_stationarity_bound(&self) -> bool {
        self.params.slack() < BOUND_SLACK
    }

    /// Row for an information-criteria comparison.
    pub fn model_entry(&self, name: impl Into<String>) -> ModelEntry {
        ModelEntry::new(name, self.loglik, self.spec.n_params(), self.nobs)
    }
}

impl GarchModel {
    /// Fit the model to the return series `y`.
    ///
    /// # Errors
    /// - Data errors from [`GarchData::new`].
    /// - [`GarchError::Optimization`] when no starting point yields an
    ///   optimum.
    pub fn fit(&self, y: &[f64], opts: &GarchFitOptions) -> GarchResult<GarchFit> {
        let data = GarchData::new(y, &self.spec)?;
        let mut outcome = self.estimate(&data, &opts.mle_opts)?;
        if self.spec.dist == Distribution::StudentT {
            outcome = self.challenge_with_normal(outcome, y, &data, &opts.mle_opts);
        }

        let params = GarchParams::from_theta(&self.spec, outcome.theta_hat.view());
        let path = self.filter(&params, &data)?;
        let loglik = self.loglik(&params, &data)?;
        let burn = data.burn();
        let nobs = data.n_eff();
        let residuals = path.resid.slice(s![burn..]).to_owned();
        let conditional_variance = path.sigma2.slice(s![burn..]).to_owned();
        let std_resid = &residuals / &conditional_variance.mapv(f64::sqrt);
        let (std_errors, robust_std_errors) = self.std_errors(&outcome.theta_hat, &data, &opts.hac);

        if !outcome.converged {
            warn!(model = %self.spec.label(), status = %outcome.status, "variance model did not converge");
        }
        if params.slack() < BOUND_SLACK {
            warn!(
                model = %self.spec.label(),
                persistence = params.persistence(),
                "variance model stuck on the stationarity bound"
            );
        }
        debug!(
            model = %self.spec.label(),
            loglik,
            persistence = params.persistence(),
            iterations = outcome.iterations,
            "fitted variance model"
        );

        let k = self.spec.n_params();
        Ok(GarchFit {
            spec: self.spec,
            params,
            loglik,
            aic: aic(loglik, k),
            bic: bic(loglik, k, nobs),
            nobs,
            std_errors,
            robust_std_errors,
            residuals,
            conditional_variance,
            std_resid,
            outcome,
            y: data.y().to_owned(),
            backcast: data.backcast(),
        })
    }

    /// Best optimum over the starting grid, refined by re-centred restarts.
    fn estimate(&self, data: &GarchData, mle_opts: &MLEOptions) -> GarchResult<OptimOutcome> {
        let mut starts = self.starting_values(data);
        if starts.is_empty() {
            starts.push(self.default_start(data).to_theta(&self.spec));
        }

        let mut last_err = None;
        for theta0 in starts.into_iter().take(MAX_START_ATTEMPTS) {
            match maximize(self, theta0, data, mle_opts) {
                Ok(out) => return Ok(self.refine(out, data, mle_opts)),
                Err(err) => {
                    debug!(model = %self.spec.label(), error = %err, "start failed; trying next");
                    last_err = Some(err);
                }
            }
        }
        Err(GarchError::Optimization(last_err.unwrap_or(OptError::UnknownError)))
    }

    /// Restart from `to_theta(from_theta(θ̂))` until the average
    /// log-likelihood stops improving by more than [`REFINE_TOL`].
    fn refine(&self, mut best: OptimOutcome, data: &GarchData, mle_opts: &MLEOptions) -> OptimOutcome {
        for round in 0..MAX_REFINE_ROUNDS {
            let theta0 = GarchParams::from_theta(&self.spec, best.theta_hat.view()).to_theta(&self.spec);
            let out = match maximize(self, theta0, data, mle_opts) {
                Ok(out) => out,
                Err(err) => {
                    debug!(model = %self.spec.label(), round, error = %err, "re-centred restart failed");
                    break;
                }
            };
            if out.value > best.value + REFINE_TOL {
                debug!(model = %self.spec.label(), round, gain = out.value - best.value, "re-centred restart improved");
                best = out;
                continue;
            }
            if out.converged && !best.converged && out.value >= best.value - REFINE_TOL {
                best = out;
            }
            break;
        }
        best
    }

    /// Restart a Student-t fit from the Normal estimate when that point
    /// scores higher than `current`.
    fn challenge_with_normal(
        &self, current: OptimOutcome, y: &[f64], data: &GarchData, mle_opts: &MLEOptions,
    ) -> OptimOutcome {
        let normal_spec = GarchSpec { dist: Distribution::Normal, ..self.spec };
        let normal = GarchModel::new(normal_spec);
        let normal_params = match GarchData::new(y, &normal_spec)
            .and_then(|normal_data| normal.estimate(&normal_data, mle_opts))
        {
            Ok(out) => GarchParams::from_theta(&normal_spec, out.theta_hat.view()),
            Err(err) => {
                debug!(model = %self.spec.label(), error = %err, "Normal reference fit failed");
                return current;
            }
        };

        let mut best = current;
        for nu in [NU_START, NU_NEAR_NORMAL] {
            let seed = GarchParams { nu: Some(nu), ..normal_params.clone() }.to_theta(&self.spec);
            let seed_value = match self.value(&seed, data) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if seed_value <= best.value + REFINE_TOL {
                continue;
            }
            debug!(model = %self.spec.label(), nu, gain = seed_value - best.value, "restarting from Normal estimate");
            match maximize(self, seed, data, mle_opts) {
                Ok(out) => {
                    let out = self.refine(out, data, mle_opts);
                    if out.value > best.value {
                        best = out;
                    }
                }
                Err(err) => debug!(model = %self.spec.label(), error = %err, "Normal-seeded restart failed"),
            }
        }
        best
    }

    /// Grid of starting vectors, best log-likelihood first.
    pub fn starting_values(&self, data: &GarchData) -> Vec<Theta> {
        let (p, o, q) = (self.spec.vol.p(), self.spec.vol.o(), self.spec.vol.q());
        let mean0 = start_mean(&self.spec, data.y());
        let variance = residual_variance(&self.spec, &mean0, data);
        let gammas: &[f64] = if o > 0 { &[0.03, 0.1, 0.2] } else { &[0.0] };
        let mut scored: Vec<(f64, Theta)> = Vec::new();
        for &a in &[0.03, 0.08, 0.15] {
            for &g in gammas {
                for &target in &[0.9, 0.96, 0.99] {
                    let a_total = if p > 0 { a } else { 0.0 };
                    let b_total = if q > 0 { target - a_total - 0.5 * g } else { 0.0 };
                    if b_total < 0.0 {
                        continue;
                    }
                    let persistence = a_total + 0.5 * g + b_total;
                    let params = GarchParams {
                        mean: mean0.clone(),
                        omega: variance * (1.0 - persistence),
                        alpha: split(a_total, p),
                        gamma: split(g, o),
                        beta: split(b_total, q),
                        nu: self.nu_start(),
                    };
                    let theta = params.to_theta(&self.spec);
                    if let Ok(value) = self.value(&theta, data) {
                        scored.push((value, theta));
                    }
                }
            }
        }
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, theta)| theta).collect()
    }

    fn default_start(&self, data: &GarchData) -> GarchParams {
        let (p, o, q) = (self.spec.vol.p(), self.spec.vol.o(), self.spec.vol.q());
        let mean0 = start_mean(&self.spec, data.y());
        let variance = residual_variance(&self.spec, &mean0, data);
        GarchParams {
            mean: mean0,
            omega: 0.1 * variance,
            alpha: split(0.05, p),
            gamma: split(0.05, o),
            beta: split(0.8, q),
            nu: self.nu_start(),
        }
    }

    fn nu_start(&self) -> Option<f64> {
        match self.spec.dist {
            Distribution::StudentT => Some(NU_START),
            Distribution::Normal => None,
        }
    }

    /// Classical and robust model-space standard errors; NaN when the
    /// information matrix cannot be formed.
    fn std_errors(
        &self, theta_hat: &Theta, data: &GarchData, hac: &HACOptions,
    ) -> (Array1<f64>, Array1<f64>) {
        let k = self.spec.n_params();
        let n = data.n_eff() as f64;
        let jac = GarchParams::jacobian(&self.spec, theta_hat.view());
        let neg_grad = |theta: &Theta| -> Grad {
            self.grad(theta, data).map(|g| -g).unwrap_or_else(|_| Array1::from_elem(theta.len(), f64::NAN))
        };

        let classical = calc_covariance(&neg_grad, theta_hat, None)
            .map(|cov| standard_errors(&delta_method(&(cov / n), &jac)))
            .unwrap_or_else(|err| {
                warn!(model = %self.spec.label(), error = %err, "classical covariance unavailable");
                Array1::from_elem(k, f64::NAN)
            });

        let robust = self
            .theta_scores(theta_hat, data)
            .map_err(GarchError::from)
            .and_then(|scores| Ok(calculate_avg_scores_cov(hac, &scores)?))
            .and_then(|meat| Ok(calc_covariance(&neg_grad, theta_hat, Some(&meat))?))
            .map(|cov| standard_errors(&delta_method(&(cov / n), &jac)))
            .unwrap_or_else(|err| {
                warn!(model = %self.spec.label(), error = %err, "robust covariance unavailable");
                Array1::from_elem(k, f64::NAN)
            });

        (classical, robust)
    }
}

/// Fit `spec` to `y`; see [`GarchModel::fit`].
pub fn fit_garch(y: &[f64], spec: GarchSpec, opts: &GarchFitOptions) -> GarchResult<GarchFit> {
    GarchModel::new(spec).fit(y, opts)
}

fn split(total: f64, n: usize) -> Array1<f64> {
    if n == 0 { Array1::zeros(0) } else { Array1::from_elem(n, total / n as f64) }
}

fn residual_variance(spec: &GarchSpec, mean: &Array1<f64>, data: &GarchData) -> f64 {
    let y = data.y();
    let burn = data.burn();
    let ss: f64 = (burn..y.len())
        .map(|t| (y[t] - conditional_mean(spec, mean.view(), y, t)).powi(2))
        .sum();
    ss / data.n_eff() as f64
}
