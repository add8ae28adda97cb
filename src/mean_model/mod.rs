//! mean_model — ARIMA(p, d, q) conditional mean models.
//!
//! Purpose
//! -------
//! Fit the mean model of a level series (prices in the analysis), expose
//! its residuals for autocorrelation and heteroskedasticity diagnostics, and
//! forecast it with prediction intervals.
//!
//! Key behaviors
//! -------------
//! - [`ArimaOrder`] / [`ArimaSpec`] validate orders and lay out the
//!   optimizer vector.
//! - [`ArimaModel`] implements the crate's `LogLikelihood` trait with the
//!   conditional sum-of-squares likelihood; [`fit_arima`] returns an
//!   [`ArimaFit`] with Gauss–Newton standard errors.
//! - [`auto_arima`] picks `d` with ADF tests and `(p, q)` by AIC or BIC.
//! - [`ArimaFit::forecast`] produces an [`ArimaForecast`].
//!
//! Invariants & assumptions
//! ------------------------
//! - AR polynomials are stationary and MA polynomials invertible for every
//!   optimizer vector (PACF reparameterization).
//! - Residuals are conditional: pre-sample errors are zero and the first
//!   `burn` differenced observations only serve as lags.
pub mod auto;
pub mod errors;
pub mod fit;
pub mod forecast;
pub mod model;
pub mod spec;

pub use self::auto::{AutoArimaOptions, AutoArimaResult, Candidate, DiffStep, auto_arima, select_d};
pub use self::errors::{ArimaError, ArimaResult};
pub use self::fit::{ArimaFit, fit_arima};
pub use self::forecast::{ArimaForecast, psi_weights};
pub use self::model::{ArimaData, ArimaModel, ArmaCoeffs};
pub use self::spec::{ArimaOrder, ArimaSpec, difference};

pub mod prelude {
    pub use super::auto::{AutoArimaOptions, AutoArimaResult, auto_arima};
    pub use super::errors::{ArimaError, ArimaResult};
    pub use super::fit::{ArimaFit, fit_arima};
    pub use super::forecast::ArimaForecast;
    pub use super::spec::{ArimaOrder, ArimaSpec};
}
