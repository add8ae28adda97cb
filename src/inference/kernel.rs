//! Kernel taps and plug-in bandwidths for HAC estimation.
//!
//! - [`KernelType`]: IID, Bartlett (Newey–West), Parzen, Quadratic Spectral.
//! - [`KernelType::weight`]: per-lag weight `w(x)` with `x = k/(L+1)`.
//! - [`KernelType::optimal_bandwidth`]: Andrews (1991) plug-in from
//!   column-wise AR(1) fits, with `α(1)` for Bartlett and `α(2)` for Parzen
//!   and QS. When the plug-in is unusable (near-unit-root column, tiny
//!   denominator, failed AR fit) it falls back to `round(n^{1/4})`.
//!
//! Input matrices are `n × p` with rows as time.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::transformations::{GENERAL_TOL, STATIONARITY_MARGIN},
};
use arima::estimate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelType {
    IID,
    Bartlett,
    Parzen,
    QuadraticSpectral,
}

impl KernelType {
    pub fn weight(&self, input: f64) -> f64 {
        let abs_input = input.abs();
        match self {
            KernelType::IID => {
                if input == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            KernelType::Bartlett => {
                if abs_input <= 1.0 {
                    1.0 - abs_input
                } else {
                    0.0
                }
            }
            KernelType::Parzen => {
                if abs_input <= 0.5 {
                    let sq = abs_input * abs_input;
                    1.0 - 6.0 * sq + 6.0 * abs_input * sq
                } else if abs_input <= 1.0 {
                    2.0 * (1.0 - abs_input).powi(3)
                } else {
                    0.0
                }
            }
            KernelType::QuadraticSpectral => {
                if input == 0.0 {
                    1.0
                } else {
                    let pi_x = std::f64::consts::PI * input;
                    let arg = 6.0 * pi_x / 5.0;
                    (25.0 / (12.0 * pi_x.powi(2))) * (arg.sin() / arg - arg.cos())
                }
            }
        }
    }

    /// Plug-in bandwidth `L` for this kernel.
    pub fn optimal_bandwidth(&self, series_mat: &Array2<f64>) -> usize {
        let n = series_mat.nrows() as f64;
        let (ord, constant, exponent) = match self {
            KernelType::IID => return 0,
            KernelType::Bartlett => (1, 1.1447, 1.0 / 3.0),
            KernelType::Parzen => (2, 2.6614, 1.0 / 5.0),
            KernelType::QuadraticSpectral => (2, 1.3221, 1.0 / 5.0),
        };
        match calc_opt_bandwidth_param(series_mat, ord) {
            Ok(alpha) => (constant * (n * alpha).powf(exponent)).round() as usize,
            Err(_) => n.powf(0.25).round() as usize,
        }
    }
}

/// Andrews' `α(q)` aggregated over columns from AR(1) fits.
fn calc_opt_bandwidth_param(series_mat: &Array2<f64>, ord: usize) -> InferenceResult<f64> {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for col in series_mat.columns() {
        let col_vec = col.to_vec();
        let coeff = estimate::fit(&col_vec, 1, 0, 0)?;
        let intercept = coeff[0];
        let phi = coeff[1];
        if !phi.is_finite() || phi.abs() >= 1.0 - STATIONARITY_MARGIN {
            return Err(InferenceError::StationarityViolated { phi });
        }
        let phi_squared = phi * phi;
        let residuals = estimate::residuals(&col_vec, intercept, Some(&[phi]), None)?;
        let sigma2 = residuals.iter().map(|&e| e * e).sum::<f64>() / ((residuals.len() - 1) as f64);
        let sigma4 = sigma2 * sigma2;
        denominator += sigma4 / (1.0 - phi_squared).powi(4);
        let scaled = 4.0 * phi_squared * sigma4;
        numerator += match ord {
            1 => scaled / ((1.0 - phi).powi(6) * (1.0 + phi) * (1.0 + phi)),
            2 => scaled / (1.0 - phi).powi(8),
            _ => return Err(InferenceError::OrderNotSupported { ord }),
        };
    }
    if !(denominator >= GENERAL_TOL) {
        return Err(InferenceError::DenominatorTooSmall { denominator });
    }
    Ok(numerator / denominator)
}
