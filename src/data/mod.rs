//! data — price acquisition, cleaning, returns and CSV exports.
//!
//! Purpose
//! -------
//! Everything that touches the outside world on the input and export side:
//! the Yahoo Finance / CSV sources, the cleaned [`PriceSeries`] and
//! [`LogReturns`], and chart-ready CSV tables.
//!
//! Invariants & assumptions
//! ------------------------
//! - Incomplete rows are removed once, in [`PriceSeries::new`]; downstream
//!   code never sees missing prices.
//! - The only network access is a single GET per run; there are no retries.

pub mod errors;
pub mod export;
pub mod series;
pub mod source;

pub use self::errors::{DataError, DataResult};
pub use self::export::{write_dated, write_series};
pub use self::series::{LogReturns, PriceSeries};
pub use self::source::{YahooSource, load_csv};

pub mod prelude {
    pub use super::errors::{DataError, DataResult};
    pub use super::series::{LogReturns, PriceSeries};
    pub use super::source::{YahooSource, load_csv};
}
