//! data::source — price history from Yahoo Finance or a local CSV file.
//!
//! Purpose
//! -------
//! Produce a [`PriceSeries`] for the analysis, either by one blocking HTTP
//! GET against the Yahoo Finance chart endpoint or by reading a CSV export.
//!
//! Key behaviors
//! -------------
//! - [`YahooSource::fetch`] requests daily bars between `start` and `end`
//!   (today when absent) and prefers the adjusted close, falling back to the
//!   raw close when the response carries no `adjclose` block.
//! - [`load_csv`] reads a headered CSV; dates use `%Y-%m-%d`; empty,
//!   `null` or unparsable prices count as missing rows.
//!
//! Conventions
//! -----------
//! - No retries: a failed request is reported once as `DataError::Http`.
//! - Response parsing is separated from transport ([`parse_chart`]) so it
//!   is testable offline.
use crate::data::{
    errors::{DataError, DataResult},
    series::PriceSeries,
};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---- Response schema ----

#[derive(Debug, Deserialize)]
pub struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    #[serde(default)]
    adjclose: Vec<AdjCloseData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Blocking Yahoo Finance chart client.
pub struct YahooSource {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl YahooSource {
    pub fn new() -> DataResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// # Errors
    /// - `DataError::InvalidUrl` when `base_url` does not parse or cannot
    ///   carry path segments.
    pub fn with_base_url(base_url: &str) -> DataResult<Self> {
        let parsed = Url::parse(base_url).map_err(|_| DataError::InvalidUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(DataError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::blocking::Client::builder().user_agent("Mozilla/5.0").build()?;
        Ok(Self { base_url: parsed, client })
    }

    /// Chart endpoint for `ticker`, with the ticker percent-encoded as one
    /// path segment.
    pub fn chart_url(&self, ticker: &str) -> DataResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DataError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        Ok(url)
    }

    /// Fetch daily prices for `ticker` from `start` through `end`.
    ///
    /// Errors
    /// ------
    /// - `DataError::Http` on transport failure or a non-success status.
    /// - `DataError::Provider` when the response carries an error object.
    /// - `DataError::EmptyResponse` / `InsufficientRows` when too few rows
    ///   come back.
    pub fn fetch(
        &self, ticker: &str, start: NaiveDate, end: Option<NaiveDate>,
    ) -> DataResult<PriceSeries> {
        let period1 = start.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp());
        let period2 = match end.and_then(|d| d.succ_opt()).and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(dt) => dt.and_utc().timestamp(),
            None => Utc::now().timestamp(),
        };
        let url = self.chart_url(ticker)?;
        info!(ticker, %start, "fetching daily prices");

        let response: YahooResponse = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        let series = parse_chart(response, ticker)?;
        info!(ticker, rows = series.len(), "fetched daily prices");
        Ok(series)
    }
}

/// Turn a decoded chart response into a cleaned [`PriceSeries`].
pub fn parse_chart(response: YahooResponse, ticker: &str) -> DataResult<PriceSeries> {
    if let Some(error) = response.chart.error {
        return Err(DataError::Provider { code: error.code, description: error.description });
    }
    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DataError::EmptyResponse { ticker: ticker.to_string() })?;

    let adjusted = data.indicators.adjclose.into_iter().next().map(|a| a.adjclose);
    let closes = match adjusted {
        Some(adj) if !adj.is_empty() => adj,
        _ => data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| DataError::EmptyResponse { ticker: ticker.to_string() })?,
    };

    let rows = data
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some((date, closes.get(i).copied().flatten()))
        })
        .collect();
    PriceSeries::new(rows)
}

/// Read a price history from a headered CSV file.
///
/// Errors
/// ------
/// - `DataError::Csv` / `Io` when the file cannot be read.
/// - `DataError::MissingColumn` when either column is absent.
/// - `DataError::InvalidDate` on an unparsable date (1-based data row).
pub fn load_csv<P: AsRef<Path>>(path: P, date_col: &str, price_col: &str) -> DataResult<PriceSeries> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_path(path)?;
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let date_idx = find(date_col)?;
    let price_idx = find(price_col)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| DataError::InvalidDate { row: row + 1, value: raw_date.to_string() })?;
        let price = record.get(price_idx).and_then(|v| v.parse::<f64>().ok());
        rows.push((date, price));
    }
    PriceSeries::new(rows)
}
