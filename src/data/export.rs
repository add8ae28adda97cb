//! Chart-ready CSV exports.
//!
//! Each export is one headered CSV table; the pipeline writes one per
//! series it would otherwise plot (prices, returns, residuals, conditional
//! volatilities, forecasts).
use crate::data::errors::DataResult;
use chrono::NaiveDate;
use std::path::Path;

/// Write `header` followed by `rows`; returns the number of data rows.
pub fn write_series<P, R, I>(path: P, header: &[&str], rows: R) -> DataResult<usize>
where
    P: AsRef<Path>,
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = String>,
{
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    let mut count = 0;
    for row in rows {
        writer.write_record(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Convenience wrapper for a dated series of one or more value columns.
pub fn write_dated<P: AsRef<Path>>(
    path: P, header: &[&str], dates: &[NaiveDate], columns: &[&[f64]],
) -> DataResult<usize> {
    let rows = dates.iter().enumerate().map(|(i, date)| {
        std::iter::once(date.format("%Y-%m-%d").to_string())
            .chain(columns.iter().map(move |c| c.get(i).map_or_else(String::new, |v| v.to_string())))
            .collect::<Vec<String>>()
    });
    write_series(path, header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Dated exports write one header and one row per date.
    //
    // Given
    // -----
    // - Two dates and two value columns.
    //
    // Expect
    // ------
    // - Three lines with ISO dates and the values.
    fn write_dated_writes_header_and_rows() {
        // Arrange
        let path = std::env::temp_dir().join("rust_volatility_write_dated_test.csv");
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];

        // Act
        let n = write_dated(&path, &["date", "a", "b"], &dates, &[&[1.5, 2.5], &[0.1, 0.2]]).unwrap();

        // Assert
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(n, 2);
        assert_eq!(text, "date,a,b\n2024-01-02,1.5,0.1\n2024-01-03,2.5,0.2\n");
        std::fs::remove_file(&path).ok();
    }
}
