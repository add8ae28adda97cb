//! Error type for data acquisition, cleaning and export.
//!
//! Transport-level failures from `reqwest`, `csv`, `serde_json` and the
//! filesystem are folded into [`DataError`] through `From`, keeping their
//! messages so the variant stays `Clone + PartialEq` like the rest of the
//! crate's error enums.
use chrono::NaiveDate;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Remote provider ----
    /// Request could not be sent or the body could not be read.
    Http(String),
    /// The provider answered with an error object.
    Provider { code: String, description: String },
    /// The provider answered without any price rows.
    EmptyResponse { ticker: String },
    /// The body was not the expected JSON document.
    Parse(String),
    /// The provider base URL cannot carry a path.
    InvalidUrl(String),

    // ---- Files ----
    Io(String),
    Csv(String),
    MissingColumn(String),
    InvalidDate { row: usize, value: String },

    // ---- Series construction ----
    InsufficientRows { needed: usize, found: usize },
    DuplicateDate(NaiveDate),
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Remote provider ----
            DataError::Http(msg) => write!(f, "Data Error: request failed: {msg}"),
            DataError::Provider { code, description } => {
                write!(f, "Data Error: provider error {code}: {description}")
            }
            DataError::EmptyResponse { ticker } => {
                write!(f, "Data Error: no price data returned for {ticker}")
            }
            DataError::Parse(msg) => write!(f, "Data Error: unexpected response body: {msg}"),
            DataError::InvalidUrl(url) => write!(f, "Data Error: invalid provider URL '{url}'"),

            // ---- Files ----
            DataError::Io(msg) => write!(f, "Data Error: I/O failure: {msg}"),
            DataError::Csv(msg) => write!(f, "Data Error: CSV failure: {msg}"),
            DataError::MissingColumn(name) => {
                write!(f, "Data Error: column '{name}' not found in CSV header")
            }
            DataError::InvalidDate { row, value } => {
                write!(f, "Data Error: row {row}: '{value}' is not a YYYY-MM-DD date")
            }

            // ---- Series construction ----
            DataError::InsufficientRows { needed, found } => write!(
                f,
                "Data Error: need at least {needed} complete rows, found {found}"
            ),
            DataError::DuplicateDate(date) => write!(f, "Data Error: duplicate date {date}"),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::Parse(err.to_string())
        } else {
            DataError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Messages embed their payloads.
    //
    // Given
    // -----
    // - A provider error and a duplicate date.
    //
    // Expect
    // ------
    // - Code, description and the ISO date appear in the messages.
    fn data_error_display_embeds_payload() {
        let provider =
            DataError::Provider { code: "Not Found".into(), description: "No data found".into() };
        let dup = DataError::DuplicateDate(NaiveDate::from_ymd_opt(2020, 3, 16).unwrap());

        assert!(provider.to_string().contains("Not Found: No data found"));
        assert!(dup.to_string().contains("2020-03-16"));
    }

    #[test]
    // Purpose
    // -------
    // JSON failures map to `Parse`.
    //
    // Given
    // -----
    // - An invalid JSON document.
    //
    // Expect
    // ------
    // - `DataError::Parse`.
    fn serde_json_error_maps_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();

        assert!(matches!(DataError::from(err), DataError::Parse(_)));
    }
}
