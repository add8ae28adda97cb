//! data::series — cleaned price history and its log-returns.
//!
//! Purpose
//! -------
//! Own the only data the analysis carries between stages: a chronological
//! price series and the returns derived from it.
//!
//! Key behaviors
//! -------------
//! - [`PriceSeries::new`] removes incomplete rows (missing, non-finite or
//!   non-positive prices), sorts by date, and rejects duplicate dates.
//! - [`PriceSeries::log_returns`] gives `r_t = ln p_t − ln p_{t−1}` dated at
//!   `t`, one element shorter than the prices.
//! - [`LogReturns::scaled`] multiplies returns by a constant (100 gives
//!   percent returns for variance fitting).
//!
//! Invariants & assumptions
//! ------------------------
//! - A `PriceSeries` holds at least two strictly positive, finite prices
//!   with strictly increasing dates; `LogReturns` is therefore non-empty.
use crate::data::errors::{DataError, DataResult};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a cleaned series from raw `(date, price)` rows.
    ///
    /// Errors
    /// ------
    /// - `DataError::DuplicateDate` if two complete rows share a date.
    /// - `DataError::InsufficientRows` if fewer than two rows survive.
    pub fn new(rows: Vec<(NaiveDate, Option<f64>)>) -> DataResult<Self> {
        let total = rows.len();
        let mut complete: Vec<(NaiveDate, f64)> = rows
            .into_iter()
            .filter_map(|(date, price)| match price {
                Some(p) if p.is_finite() && p > 0.0 => Some((date, p)),
                _ => None,
            })
            .collect();
        let dropped = total - complete.len();
        if dropped > 0 {
            debug!(dropped, total, "removed incomplete price rows");
        }
        if complete.len() < 2 {
            return Err(DataError::InsufficientRows { needed: 2, found: complete.len() });
        }

        complete.sort_by_key(|(date, _)| *date);
        if let Some(w) = complete.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(DataError::DuplicateDate(w[0].0));
        }
        let (dates, prices) = complete.into_iter().unzip();
        Ok(PriceSeries { dates, prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Log-returns dated at the later of each pair of consecutive prices.
    pub fn log_returns(&self) -> DataResult<LogReturns> {
        if self.len() < 2 {
            return Err(DataError::InsufficientRows { needed: 2, found: self.len() });
        }
        let values = self.prices.windows(2).map(|w| w[1].ln() - w[0].ln()).collect();
        Ok(LogReturns { dates: self.dates[1..].to_vec(), values })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogReturns {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl LogReturns {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Vec<f64> {
        self.values.iter().map(|r| r * factor).collect()
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.len() as f64
    }

    /// Sample standard deviation (denominator `n − 1`).
    pub fn std_dev(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        (self.values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover row cleaning, ordering, duplicate detection, the
    // log-return definition and scaling.
    // -------------------------------------------------------------------------

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Incomplete rows are dropped and the rest sorted.
    //
    // Given
    // -----
    // - Unsorted rows with a missing, a NaN and a zero price.
    //
    // Expect
    // ------
    // - Three rows remain in date order.
    fn price_series_drops_incomplete_rows_and_sorts() {
        // Arrange
        let rows = vec![
            (day(5), Some(102.0)),
            (day(2), Some(100.0)),
            (day(3), None),
            (day(4), Some(f64::NAN)),
            (day(6), Some(0.0)),
            (day(8), Some(101.0)),
        ];

        // Act
        let series = PriceSeries::new(rows).unwrap();

        // Assert
        assert_eq!(series.prices(), &[100.0, 102.0, 101.0]);
        assert_eq!(series.dates(), &[day(2), day(5), day(8)]);
        assert_eq!(series.first_date(), Some(day(2)));
    }

    #[test]
    // Purpose
    // -------
    // Duplicate dates and too few rows are rejected.
    //
    // Given
    // -----
    // - Two complete rows on one date; a single complete row.
    //
    // Expect
    // ------
    // - `DuplicateDate` and `InsufficientRows`.
    fn price_series_rejects_duplicates_and_short_input() {
        let dup = PriceSeries::new(vec![(day(2), Some(1.0)), (day(2), Some(2.0))]);
        let short = PriceSeries::new(vec![(day(2), Some(1.0)), (day(3), None)]);

        assert_eq!(dup, Err(DataError::DuplicateDate(day(2))));
        assert_eq!(short, Err(DataError::InsufficientRows { needed: 2, found: 1 }));
    }

    #[test]
    // Purpose
    // -------
    // Log-returns follow their definition and are one shorter.
    //
    // Given
    // -----
    // - Prices 100, 110, 99.
    //
    // Expect
    // ------
    // - ln(1.1), ln(0.9), dated at the 2nd and 3rd rows; scaled ×100.
    fn log_returns_match_definition() {
        // Arrange
        let series =
            PriceSeries::new(vec![(day(1), Some(100.0)), (day(2), Some(110.0)), (day(3), Some(99.0))])
                .unwrap();

        // Act
        let returns = series.log_returns().unwrap();

        // Assert
        assert_eq!(returns.len(), series.len() - 1);
        assert_relative_eq!(returns.values()[0], 1.1_f64.ln(), epsilon = 1e-15);
        assert_relative_eq!(returns.values()[1], 0.9_f64.ln(), epsilon = 1e-15);
        assert_eq!(returns.dates(), &[day(2), day(3)]);
        assert_relative_eq!(returns.scaled(100.0)[0], 100.0 * 1.1_f64.ln(), epsilon = 1e-12);
    }
}
