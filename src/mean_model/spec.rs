//! ARIMA orders, specifications and differencing.
//!
//! The unconstrained optimizer vector of an [`ArimaSpec`] is laid out as
//! `[c?, raw_φ₁..raw_φ_p, raw_θ₁..raw_θ_q]`: the intercept enters directly,
//! AR and MA coefficients go through the PACF map so every θ yields a
//! stationary and invertible ARMA.
use crate::mean_model::errors::{ArimaError, ArimaResult};
use serde::{Deserialize, Serialize};

/// Largest AR or MA order accepted.
pub const MAX_ARMA_ORDER: usize = 10;
/// Largest differencing order accepted.
pub const MAX_DIFF_ORDER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    /// Validated order.
    ///
    /// # Errors
    /// - [`ArimaError::InvalidOrder`] if `p` or `q` exceed
    ///   [`MAX_ARMA_ORDER`] or `d` exceeds [`MAX_DIFF_ORDER`].
    pub fn new(p: usize, d: usize, q: usize) -> ArimaResult<Self> {
        if p > MAX_ARMA_ORDER || q > MAX_ARMA_ORDER {
            return Err(ArimaError::InvalidOrder { p, d, q, reason: "AR and MA orders must be at most 10" });
        }
        if d > MAX_DIFF_ORDER {
            return Err(ArimaError::InvalidOrder { p, d, q, reason: "differencing order must be at most 2" });
        }
        Ok(ArimaOrder { p, d, q })
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaSpec {
    pub order: ArimaOrder,
    pub with_constant: bool,
}

impl ArimaSpec {
    pub fn new(order: ArimaOrder, with_constant: bool) -> Self {
        ArimaSpec { order, with_constant }
    }

    /// Length of the optimizer vector: `const + p + q`.
    pub fn n_coeffs(&self) -> usize {
        usize::from(self.with_constant) + self.order.p + self.order.q
    }

    /// Parameter count for information criteria (coefficients plus σ²).
    pub fn n_params(&self) -> usize {
        self.n_coeffs() + 1
    }

    /// `"const"`, `"ar.L1"`, …, `"ma.L1"`, … in optimizer order.
    pub fn coeff_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_coeffs());
        if self.with_constant {
            names.push("const".to_string());
        }
        names.extend((1..=self.order.p).map(|i| format!("ar.L{i}")));
        names.extend((1..=self.order.q).map(|j| format!("ma.L{j}")));
        names
    }
}

/// `d`-th difference of `series` (length `n − d`).
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Orders are bounded and parameter counts include σ².
    //
    // Given
    // -----
    // - ARIMA(2,1,1) with a constant; d = 3.
    //
    // Expect
    // ------
    // - 4 coefficients, 5 parameters, named in optimizer order; d = 3 fails.
    fn arima_spec_counts_and_names() {
        let spec = ArimaSpec::new(ArimaOrder::new(2, 1, 1).unwrap(), true);

        assert_eq!(spec.n_coeffs(), 4);
        assert_eq!(spec.n_params(), 5);
        assert_eq!(spec.coeff_names(), vec!["const", "ar.L1", "ar.L2", "ma.L1"]);
        assert_eq!(spec.order.to_string(), "ARIMA(2,1,1)");
        assert!(matches!(ArimaOrder::new(0, 3, 0), Err(ArimaError::InvalidOrder { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Repeated differencing.
    //
    // Given
    // -----
    // - Squares 0, 1, 4, 9, 16.
    //
    // Expect
    // ------
    // - First differences 1, 3, 5, 7; second differences all 2.
    fn difference_of_squares() {
        let squares = [0.0, 1.0, 4.0, 9.0, 16.0];

        assert_eq!(difference(&squares, 1), vec![1.0, 3.0, 5.0, 7.0]);
        assert_eq!(difference(&squares, 2), vec![2.0, 2.0, 2.0]);
        assert_eq!(difference(&squares, 0), squares.to_vec());
    }
}
