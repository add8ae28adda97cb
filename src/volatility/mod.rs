//! volatility — GARCH and GJR-GARCH conditional variance models.
//!
//! Purpose
//! -------
//! Estimate the variance dynamics of a return series, forecast them over a
//! horizon and simulate paths from fitted or hypothesized parameters.
//!
//! Key behaviors
//! -------------
//! - [`GarchSpec`] combines a [`MeanSpec`], a [`VolatilitySpec`] and an
//!   innovation [`Distribution`].
//! - [`GarchModel`] implements the crate's `LogLikelihood` trait with
//!   analytic scores; [`fit_garch`] returns a [`GarchFit`] with classical
//!   and robust standard errors.
//! - [`GarchFit::forecast`] produces a [`VolatilityForecast`];
//!   [`simulate`] draws paths.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every optimizer vector maps to `ω > 0`, non-negative lag coefficients
//!   and persistence `Σα + ½Σγ + Σβ < 1`.
//! - Pre-sample squared shocks and variances are the exponentially weighted
//!   backcast of the starting-mean residuals.
pub mod errors;
pub mod fit;
pub mod forecast;
pub mod model;
pub mod params;
pub mod simulate;
pub mod spec;

pub use self::errors::{GarchError, GarchResult};
pub use self::fit::{BOUND_SLACK, GarchFit, GarchFitOptions, fit_garch};
pub use self::forecast::{TRADING_DAYS, VolatilityForecast};
pub use self::model::{GarchData, GarchModel, VariancePath, backcast};
pub use self::params::{GarchParams, NU_FLOOR};
pub use self::simulate::{SimOptions, SimulatedPath, simulate};
pub use self::spec::{Distribution, GarchSpec, MeanSpec, VolatilitySpec};

pub mod prelude {
    pub use super::errors::{GarchError, GarchResult};
    pub use super::fit::{GarchFit, GarchFitOptions, fit_garch};
    pub use super::forecast::VolatilityForecast;
    pub use super::spec::{Distribution, GarchSpec, MeanSpec, VolatilitySpec};
}
