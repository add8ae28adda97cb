//! Coefficient tables for fitted models.
//!
//! [`coef_table`] pairs estimates with standard errors and adds Wald
//! z-statistics with two-sided normal p-values, `p = erfc(|z|/√2)`. Rows
//! with a zero or non-finite standard error get `NaN` statistics.
use serde::Serialize;
use statrs::function::erf::erfc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_stat: f64,
    pub p_value: f64,
}

pub fn coef_table(names: &[String], estimates: &[f64], std_errors: &[f64]) -> Vec<CoefRow> {
    names
        .iter()
        .zip(estimates)
        .zip(std_errors)
        .map(|((name, &estimate), &std_error)| {
            let (z_stat, p_value) = if std_error > 0.0 && std_error.is_finite() {
                let z = estimate / std_error;
                (z, erfc(z.abs() / std::f64::consts::SQRT_2))
            } else {
                (f64::NAN, f64::NAN)
            };
            CoefRow { name: name.clone(), estimate, std_error, z_stat, p_value }
        })
        .collect()
}
