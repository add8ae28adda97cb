//! rust_volatility — unit-root, ARIMA and GARCH-family analysis of daily
//! equity index prices.
//!
//! Purpose
//! -------
//! Serve as the crate root for the analysis library and the
//! `rust_volatility` binary. The library follows one methodological path:
//! test prices for a unit root, fit a mean model, diagnose its residuals,
//! move to log-returns, confirm their stationarity, fit symmetric and
//! asymmetric variance models, compare them and forecast risk.
//!
//! Key behaviors
//! -------------
//! - `data`: Yahoo Finance / CSV loading, cleaning, log-returns, CSV exports.
//! - `statistical_tests`: ADF, Ljung–Box, ARCH-LM, sign bias.
//! - `optimization` and `inference`: the shared likelihood maximizer and
//!   classical / robust covariance estimation.
//! - `mean_model`: ARIMA fitting, automatic order selection, forecasts.
//! - `volatility`: GARCH and GJR-GARCH fitting, forecasts, simulation.
//! - `comparison`: information criteria and likelihood-ratio tests.
//! - `pipeline`: configuration, the staged run and the report.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every fallible operation returns its module's error type; the
//!   pipeline folds them into `PipelineError`.
//! - Fitted models are immutable values; forecasts never mutate them.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use rust_volatility::pipeline::{Pipeline, PipelineConfig, render};
//!
//! let report = Pipeline::run(PipelineConfig::default()).unwrap();
//! render(&report, &mut std::io::stdout()).unwrap();
//! ```

pub mod comparison;
pub mod data;
pub mod inference;
pub mod mean_model;
pub mod optimization;
pub mod pipeline;
pub mod statistical_tests;
pub mod volatility;
