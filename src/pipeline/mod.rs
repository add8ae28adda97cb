//! pipeline — the end-to-end volatility analysis.
//!
//! Purpose
//! -------
//! Chain the crate's building blocks into the fixed sequence of the
//! analysis and collect the results in one serializable report.
//!
//! Key behaviors
//! -------------
//! - [`PipelineConfig`]: defaults, JSON loading and validation.
//! - [`Pipeline::run`]: load prices, then run the ten analysis stages.
//! - [`AnalysisReport`] / [`render`]: structured results and the console
//!   narrative interpreting every test at `alpha`.
//!
//! Invariants & assumptions
//! ------------------------
//! - No variance model is fitted unless the log-returns reject a unit root;
//!   otherwise the run stops with [`PipelineError::ReturnsNotStationary`].
//! - The forecast uses whichever variance model the configured criterion
//!   prefers.
pub mod config;
pub mod errors;
pub mod report;
pub mod run;

pub use self::config::{DEFAULT_TICKER, PipelineConfig};
pub use self::errors::{PipelineError, PipelineResult};
pub use self::report::{AnalysisReport, render};
pub use self::run::Pipeline;
