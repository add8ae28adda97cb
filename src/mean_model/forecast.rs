//! Multi-step ARIMA forecasts with normal prediction intervals.
//!
//! Point forecasts extend the differenced series with future errors set to
//! zero and then undo the differencing. Forecast variances come from the
//! ψ-weights of `θ(L) / (φ(L)(1 − L)^d)`: `Var_h = σ² Σ_{j<h} ψ_j²`.
use crate::mean_model::{
    errors::{ArimaError, ArimaResult},
    fit::ArimaFit,
    spec::difference,
};
use serde::Serialize;
use statrs::function::erf::erf_inv;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaForecast {
    pub mean: Vec<f64>,
    pub std_error: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    /// Two-sided interval coverage, e.g. 0.95.
    pub level: f64,
}

impl ArimaForecast {
    pub fn horizon(&self) -> usize {
        self.mean.len()
    }
}

impl ArimaFit {
    /// Forecast `horizon` steps past the end of the fitted series.
    ///
    /// # Errors
    /// - [`ArimaError::InvalidHorizon`] when `horizon == 0`.
    /// - [`ArimaError::InvalidLevel`] unless `0 < level < 1`.
    pub fn forecast(&self, horizon: usize, level: f64) -> ArimaResult<ArimaForecast> {
        if horizon == 0 {
            return Err(ArimaError::InvalidHorizon { horizon });
        }
        if !(level > 0.0 && level < 1.0) {
            return Err(ArimaError::InvalidLevel { level });
        }
        let coeffs = self.coeffs();
        let n = self.w.len();
        let mut w_ext = self.w.to_vec();
        let mut e_ext = self.e.to_vec();
        for t in n..n + horizon {
            let mut v = coeffs.constant;
            for (i, phi) in coeffs.ar.iter().enumerate() {
                v += phi * w_ext[t - 1 - i];
            }
            for (j, theta) in coeffs.ma.iter().enumerate() {
                if let Some(lag) = t.checked_sub(j + 1) {
                    v += theta * e_ext[lag];
                }
            }
            w_ext.push(v);
            e_ext.push(0.0);
        }

        let mean = integrate(&self.levels, &w_ext[n..], self.spec.order.d);
        let psi = psi_weights(
            coeffs.ar.as_slice().unwrap_or(&[]),
            coeffs.ma.as_slice().unwrap_or(&[]),
            self.spec.order.d,
            horizon,
        );
        let mut cum = 0.0;
        let std_error: Vec<f64> = psi
            .iter()
            .map(|w| {
                cum += w * w;
                (self.sigma2 * cum).sqrt()
            })
            .collect();
        let z = std::f64::consts::SQRT_2 * erf_inv(level);
        let lower = mean.iter().zip(&std_error).map(|(m, s)| m - z * s).collect();
        let upper = mean.iter().zip(&std_error).map(|(m, s)| m + z * s).collect();
        Ok(ArimaForecast { mean, std_error, lower, upper, level })
    }
}

/// Undo `d` differences, anchoring each level on the last observed value.
fn integrate(levels: &[f64], forecasts: &[f64], d: usize) -> Vec<f64> {
    let mut out = forecasts.to_vec();
    for k in (0..d).rev() {
        let mut last = difference(levels, k).last().copied().unwrap_or(0.0);
        out = out
            .iter()
            .map(|x| {
                last += x;
                last
            })
            .collect();
    }
    out
}

/// First `horizon` ψ-weights of `θ(L) / (φ(L)(1 − L)^d)`, `ψ_0 = 1`.
pub fn psi_weights(ar: &[f64], ma: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    // Lag polynomial 1 − Σ φ_i Lⁱ times (1 − L)^d.
    let mut poly = vec![1.0];
    poly.extend(ar.iter().map(|phi| -phi));
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    let mut psi = vec![0.0; horizon];
    for j in 0..horizon {
        let mut v = if j == 0 { 1.0 } else { ma.get(j - 1).copied().unwrap_or(0.0) };
        for i in 1..poly.len().min(j + 1) {
            v -= poly[i] * psi[j - i];
        }
        psi[j] = v;
    }
    psi
}
