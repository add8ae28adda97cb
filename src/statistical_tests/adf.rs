//! statistical_tests::adf — augmented Dickey–Fuller unit-root test.
//!
//! Purpose
//! -------
//! Test `H₀: unit root` against a stationary alternative for price and
//! return series, and pick the differencing order in automatic ARIMA
//! selection.
//!
//! Key behaviors
//! -------------
//! - Regression `Δy_t = [c] [+ δt] + ρ y_{t−1} + Σ_{i=1..L} γ_i Δy_{t−i} + e_t`,
//!   with the deterministic part chosen by [`AdfRegression`].
//! - Lag order either fixed or selected by AIC ([`AdfLag`]). AIC selection
//!   compares all `L ∈ 0..=maxlag` on the common sample that the largest
//!   lag allows, then re-estimates the chosen `L` on its full sample.
//! - Statistic: the OLS t-ratio of `ρ`. p-value from MacKinnon's (1994)
//!   response surface; 1/5/10% critical values from MacKinnon (2010) at the
//!   regression's sample size.
//!
//! Invariants & assumptions
//! ------------------------
//! - Default `maxlag = ⌈12 (n/100)^{1/4}⌉`, capped at `n/2 − ntrend − 1`.
//! - The response surface saturates: statistics above its upper bound give
//!   `p = 1`, below its lower bound `p = 0`.
//!
//! Conventions
//! -----------
//! - Serialized regression labels are `"n"`, `"c"` and `"ct"`.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the response-surface and critical-value polynomials to
//!   hand-evaluated points and check rejection on white noise versus
//!   non-rejection on an explosive path.
use crate::statistical_tests::{
    distributions::normal_cdf,
    errors::{TestError, TestResult},
    ols::OlsFit,
    outcome::TestOutcome,
    validation::{validate_lags, validate_series},
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Deterministic terms of the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdfRegression {
    #[serde(rename = "n")]
    NoConstant,
    #[default]
    #[serde(rename = "c")]
    Constant,
    #[serde(rename = "ct")]
    ConstantTrend,
}

impl AdfRegression {
    pub fn n_trend(&self) -> usize {
        match self {
            AdfRegression::NoConstant => 0,
            AdfRegression::Constant => 1,
            AdfRegression::ConstantTrend => 2,
        }
    }

    fn surface(&self) -> &'static ResponseSurface {
        match self {
            AdfRegression::NoConstant => &SURFACE_N,
            AdfRegression::Constant => &SURFACE_C,
            AdfRegression::ConstantTrend => &SURFACE_CT,
        }
    }
}

/// Lag-order rule for the augmentation terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdfLag {
    Fixed(usize),
    Aic { maxlag: Option<usize> },
}

impl Default for AdfLag {
    fn default() -> Self {
        AdfLag::Aic { maxlag: None }
    }
}

/// 1%, 5% and 10% critical values of the τ statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// AdfOutcome — result of one augmented Dickey–Fuller test.
///
/// Fields
/// ------
/// - `stat`: t-ratio of the lagged level.
/// - `p_value`: MacKinnon approximate p-value.
/// - `used_lag`: number of lagged differences in the final regression.
/// - `nobs`: observations in the final regression.
/// - `critical_values`: finite-sample 1/5/10% values at `nobs`.
/// - `regression`: deterministic terms used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdfOutcome {
    stat: f64,
    p_value: f64,
    used_lag: usize,
    nobs: usize,
    critical_values: CriticalValues,
    regression: AdfRegression,
}

impl AdfOutcome {
    /// Run the augmented Dickey–Fuller test on a level series.
    ///
    /// Errors
    /// ------
    /// - `TestError::InsufficientData` / `InvalidData` from input
    ///   validation, including series too short for any lag.
    /// - `TestError::InvalidLags` when a requested lag order exceeds
    ///   `n/2 − ntrend − 1`.
    /// - `TestError::SingularDesign` for degenerate (e.g. constant) input.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// use rust_volatility::statistical_tests::{AdfLag, AdfOutcome, AdfRegression, TestOutcome};
    ///
    /// let noise: Vec<f64> = (0..200).map(|t| ((t * 7919) % 101) as f64 / 50.0 - 1.0).collect();
    /// let outcome = AdfOutcome::adf(&noise, AdfRegression::Constant, AdfLag::default()).unwrap();
    /// assert!((0.0..=1.0).contains(&outcome.p_value()));
    /// ```
    pub fn adf(data: &[f64], regression: AdfRegression, lag: AdfLag) -> TestResult<Self> {
        let n_trend = regression.n_trend();
        let min_len = 2 * n_trend + 4;
        validate_series(data, min_len)?;
        let n = data.len();
        let cap = n / 2 - n_trend - 1;

        let used_lag = match lag {
            AdfLag::Fixed(l) => {
                if l > cap {
                    return Err(TestError::InvalidLags(l));
                }
                l
            }
            AdfLag::Aic { maxlag } => {
                let maxlag = maxlag.unwrap_or_else(|| default_maxlag(n, n_trend)).min(cap);
                select_lag_by_aic(data, regression, maxlag)?
            }
        };

        let (y, x) = adf_design(data, regression, used_lag, used_lag);
        let fit = OlsFit::fit(&y, &x)?;
        let stat = fit.params[0] / fit.std_errors[0];
        let nobs = y.len();

        Ok(AdfOutcome {
            stat,
            p_value: mackinnon_p(stat, regression)?,
            used_lag,
            nobs,
            critical_values: mackinnon_crit(regression, nobs),
            regression,
        })
    }

    pub fn used_lag(&self) -> usize {
        self.used_lag
    }

    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn critical_values(&self) -> CriticalValues {
        self.critical_values
    }

    pub fn regression(&self) -> AdfRegression {
        self.regression
    }
}

impl TestOutcome for AdfOutcome {
    fn statistic(&self) -> f64 {
        self.stat
    }

    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// `min(⌈12 (n/100)^{1/4}⌉, n/2 − ntrend − 1)`.
pub fn default_maxlag(n: usize, n_trend: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min((n / 2).saturating_sub(n_trend + 1))
}

/// MacKinnon (1994) approximate p-value for a single-series τ statistic.
pub fn mackinnon_p(stat: f64, regression: AdfRegression) -> TestResult<f64> {
    let surface = regression.surface();
    if stat > surface.tau_max {
        return Ok(1.0);
    }
    if stat < surface.tau_min {
        return Ok(0.0);
    }
    let value = if stat <= surface.tau_star {
        polyval(&surface.small_p, stat)
    } else {
        polyval(&surface.large_p, stat)
    };
    normal_cdf(value)
}

/// MacKinnon (2010) finite-sample critical values at `nobs`.
pub fn mackinnon_crit(regression: AdfRegression, nobs: usize) -> CriticalValues {
    let crit = &regression.surface().crit;
    let inv_n = 1.0 / nobs as f64;
    CriticalValues {
        one_pct: polyval(&crit[0], inv_n),
        five_pct: polyval(&crit[1], inv_n),
        ten_pct: polyval(&crit[2], inv_n),
    }
}

// ---- Response surfaces ----

struct ResponseSurface {
    tau_max: f64,
    tau_min: f64,
    tau_star: f64,
    small_p: [f64; 3],
    large_p: [f64; 4],
    crit: [[f64; 4]; 3],
}

const SURFACE_N: ResponseSurface = ResponseSurface {
    tau_max: f64::INFINITY,
    tau_min: -19.04,
    tau_star: -1.04,
    small_p: [0.6344, 1.2378, 0.032496],
    large_p: [0.4797, 0.93557, -0.06999, 0.033066],
    crit: [
        [-2.56574, -2.2358, -3.627, 0.0],
        [-1.94100, -0.2686, -3.365, 31.223],
        [-1.61682, 0.2656, -2.714, 25.364],
    ],
};

const SURFACE_C: ResponseSurface = ResponseSurface {
    tau_max: 2.74,
    tau_min: -18.83,
    tau_star: -1.61,
    small_p: [2.1659, 1.4412, 0.038269],
    large_p: [1.7339, 0.93202, -0.12745, -0.010368],
    crit: [
        [-3.43035, -6.5393, -16.786, -79.433],
        [-2.86154, -2.8903, -4.234, -40.040],
        [-2.56677, -1.5384, -2.809, 0.0],
    ],
};

const SURFACE_CT: ResponseSurface = ResponseSurface {
    tau_max: 0.7,
    tau_min: -16.18,
    tau_star: -2.89,
    small_p: [3.2512, 1.6047, 0.049588],
    large_p: [2.5261, 0.61654, -0.37956, -0.060285],
    crit: [
        [-3.95877, -9.0531, -28.428, -134.155],
        [-3.41049, -4.3904, -9.036, -45.374],
        [-3.12705, -2.5856, -3.925, -22.380],
    ],
};

// ---- Helper methods ----

/// Horner evaluation, coefficients lowest order first.
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Response and design for `lags` augmentation terms on the sample that
/// `sample_lag` leaves. Columns: `y_{t−1}`, `Δy_{t−1..t−lags}`, then the
/// deterministic terms.
fn adf_design(
    data: &[f64], regression: AdfRegression, lags: usize, sample_lag: usize,
) -> (Vec<f64>, Array2<f64>) {
    let diff: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let rows: Vec<usize> = (sample_lag..diff.len()).collect();
    let n_trend = regression.n_trend();
    let k = 1 + lags + n_trend;

    let y: Vec<f64> = rows.iter().map(|&i| diff[i]).collect();
    let mut x = Array2::<f64>::zeros((rows.len(), k));
    for (r, &i) in rows.iter().enumerate() {
        x[[r, 0]] = data[i];
        for j in 1..=lags {
            x[[r, j]] = diff[i - j];
        }
        if n_trend >= 1 {
            x[[r, 1 + lags]] = 1.0;
        }
        if n_trend == 2 {
            x[[r, 2 + lags]] = (r + 1) as f64;
        }
    }
    (y, x)
}

/// Lag with minimal AIC among `0..=maxlag`, all on the `maxlag` sample.
fn select_lag_by_aic(data: &[f64], regression: AdfRegression, maxlag: usize) -> TestResult<usize> {
    validate_lags(data.len(), maxlag + 1)?;
    let mut best: Option<(usize, f64)> = None;
    for lags in 0..=maxlag {
        let (y, x) = adf_design(data, regression, lags, maxlag);
        let aic = OlsFit::fit(&y, &x)?.aic();
        if best.map_or(true, |(_, b)| aic < b) {
            best = Some((lags, aic));
        }
    }
    Ok(best.map_or(0, |(lags, _)| lags))
}
