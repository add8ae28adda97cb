//! inference::hac — score covariance for sandwich standard errors.
//!
//! Purpose
//! -------
//! Estimate `S`, the long-run covariance of the per-observation scores of a
//! fitted likelihood, on the average-score scale. `S` is the "meat" of the
//! Bollerslev–Wooldridge sandwich used for robust GARCH standard errors.
//!
//! Key behaviors
//! -------------
//! - [`HACOptions`] selects the kernel, a fixed or plug-in bandwidth,
//!   optional centering, and the Newey–West small-sample scaling.
//! - [`calculate_avg_scores_cov`] returns `Γ₀ + Σ_{k=1..L} w_k (Γ_k + Γ_kᵀ)`
//!   with `Γ_k = c_k Σ_t s_t s_{t−k}ᵀ`, where `c_k = 1/(n−k)` with
//!   small-sample correction and `1/n` otherwise.
//!
//! Invariants & assumptions
//! ------------------------
//! - `raw_scores` is `n × p` (rows = observations) with `n ≥ 2`, `p ≥ 1`,
//!   and finite entries; violations are reported as `InferenceError`.
//! - The effective bandwidth never exceeds `n − 1`.
//!
//! Conventions
//! -----------
//! - With [`KernelType::IID`] the result is the outer-product-of-gradients
//!   estimator `(1/n) Sᵀ S`, the classic QMLE choice for GARCH models whose
//!   scores are a martingale difference sequence.
//!
//! Testing notes
//! -------------
//! - Unit tests check the OPG reduction, centering invariance, symmetry,
//!   the effect of the small-sample correction, and a hand-computed
//!   Bartlett example.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    kernel::KernelType,
};
use ndarray::{Array2, Axis, s};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, cmp::min};

/// HAC configuration.
///
/// Default: IID kernel (OPG), plug-in bandwidth, no centering, small-sample
/// correction on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HACOptions {
    pub kernel: KernelType,
    pub bandwidth: Option<usize>,
    pub center: bool,
    pub small_sample_correction: bool,
}

impl HACOptions {
    pub fn new(
        bandwidth: Option<usize>, kernel: KernelType, center: bool, small_sample_correction: bool,
    ) -> HACOptions {
        HACOptions { bandwidth, kernel, center, small_sample_correction }
    }
}

impl Default for HACOptions {
    fn default() -> Self {
        Self { bandwidth: None, kernel: KernelType::IID, center: false, small_sample_correction: true }
    }
}

/// Covariance of the average score.
///
/// # Errors
/// - [`InferenceError::InsufficientScores`] when `n < 2` or `p == 0`.
/// - [`InferenceError::NonFiniteScore`] for NaN/∞ entries.
pub fn calculate_avg_scores_cov(
    hac_opts: &HACOptions, raw_scores: &Array2<f64>,
) -> InferenceResult<Array2<f64>> {
    let (n, p) = raw_scores.dim();
    if n < 2 || p == 0 {
        return Err(InferenceError::InsufficientScores { rows: n, cols: p });
    }
    if let Some(((row, col), _)) = raw_scores.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(InferenceError::NonFiniteScore { row, col });
    }

    let scores: Cow<'_, Array2<f64>> = match (hac_opts.center, raw_scores.mean_axis(Axis(0))) {
        (true, Some(col_means)) => Cow::Owned(raw_scores - &col_means),
        _ => Cow::Borrowed(raw_scores),
    };

    let bandwidth = match hac_opts.bandwidth {
        Some(bw) => min(bw, n - 1),
        None => min(hac_opts.kernel.optimal_bandwidth(scores.as_ref()), n - 1),
    };

    let mut avg_scores = Array2::<f64>::zeros((p, p));
    for lag in 0..=bandwidth {
        add_hac_component(&mut avg_scores, scores.as_ref(), lag, bandwidth, hac_opts);
    }
    Ok(avg_scores)
}

// ---- Helper methods ----

fn add_hac_component(
    avg_scores: &mut Array2<f64>, scores: &Array2<f64>, lag: usize, bandwidth: usize,
    hac_opts: &HACOptions,
) {
    let n = scores.nrows();
    if lag == 0 {
        avg_scores.scaled_add(1.0 / (n as f64), &scores.t().dot(scores));
        return;
    }
    let weight = hac_opts.kernel.weight(lag as f64 / (bandwidth + 1) as f64);
    if weight == 0.0 {
        return;
    }
    let scale = if hac_opts.small_sample_correction {
        1.0 / ((n - lag) as f64)
    } else {
        1.0 / (n as f64)
    };
    let scores_lagged = scores.slice(s![lag.., ..]);
    let scores_leading = scores.slice(s![..n - lag, ..]);
    let gamma_k = scores_lagged.t().dot(&scores_leading) * scale;
    avg_scores.scaled_add(weight, &gamma_k);
    avg_scores.scaled_add(weight, &gamma_k.t());
}
