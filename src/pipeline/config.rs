//! Run configuration of the analysis.
//!
//! [`PipelineConfig`] deserializes from JSON with every field optional
//! (missing fields take their defaults); the binary then applies command
//! line overrides and calls [`PipelineConfig::validate`].
use crate::{
    comparison::Criterion,
    mean_model::auto::AutoArimaOptions,
    pipeline::errors::{PipelineError, PipelineResult},
    volatility::{
        fit::GarchFitOptions,
        spec::{Distribution, MeanSpec, VolatilitySpec},
    },
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TICKER: &str = "^GSPC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // ---- Data ----
    pub ticker: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    /// Read prices from this CSV instead of the remote provider.
    pub csv: Option<PathBuf>,
    pub csv_date_column: String,
    pub csv_price_column: String,

    // ---- Decisions ----
    /// Significance level for every test the narrative branches on.
    pub alpha: f64,
    pub horizon: usize,
    /// Returns are multiplied by this before variance fitting (100 = percent).
    pub return_scale: f64,
    pub var_level: f64,
    pub criterion: Criterion,

    // ---- Models ----
    /// ARIMA search; its ADF level is replaced by `alpha` at run time.
    pub arima: AutoArimaOptions,
    pub ljung_box_lags: usize,
    pub arch_lm_lags: usize,
    pub garch: VolatilitySpec,
    pub gjr: VolatilitySpec,
    pub mean: MeanSpec,
    pub dist: Distribution,
    pub garch_fit: GarchFitOptions,

    // ---- Output ----
    pub export_dir: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            ticker: DEFAULT_TICKER.to_string(),
            start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN),
            end: None,
            csv: None,
            csv_date_column: "Date".to_string(),
            csv_price_column: "Adj Close".to_string(),
            alpha: 0.05,
            horizon: 30,
            return_scale: 100.0,
            var_level: 0.95,
            criterion: Criterion::Aic,
            arima: AutoArimaOptions::default(),
            ljung_box_lags: 10,
            arch_lm_lags: 10,
            garch: VolatilitySpec::Garch { p: 1, q: 1 },
            gjr: VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 },
            mean: MeanSpec::Constant,
            dist: Distribution::Normal,
            garch_fit: GarchFitOptions::default(),
            export_dir: None,
            report_json: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file; absent fields keep their defaults.
    ///
    /// # Errors
    /// - [`PipelineError::InvalidConfig`] when the file cannot be read or
    ///   parsed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| PipelineError::InvalidConfig {
            field: "config",
            reason: format!("{}: {e}", path.as_ref().display()),
        })?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::InvalidConfig { field: "config", reason: e.to_string() })
    }

    /// # Errors
    /// - [`PipelineError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.csv.is_none() && self.ticker.trim().is_empty() {
            return Err(invalid("ticker", "must be non-empty when no CSV is given"));
        }
        if let Some(end) = self.end {
            if end <= self.start {
                return Err(invalid("end", format!("{end} is not after start {}", self.start)));
            }
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(invalid("alpha", format!("{} is not in (0, 1)", self.alpha)));
        }
        if !(self.var_level > 0.0 && self.var_level < 1.0) {
            return Err(invalid("var_level", format!("{} is not in (0, 1)", self.var_level)));
        }
        if self.horizon == 0 {
            return Err(invalid("horizon", "must be at least 1"));
        }
        if !(self.return_scale > 0.0 && self.return_scale.is_finite()) {
            return Err(invalid("return_scale", format!("{} is not finite and > 0", self.return_scale)));
        }
        if self.ljung_box_lags == 0 {
            return Err(invalid("ljung_box_lags", "must be at least 1"));
        }
        if self.arch_lm_lags == 0 {
            return Err(invalid("arch_lm_lags", "must be at least 1"));
        }
        self.garch.validate().map_err(|e| invalid("garch", e.to_string()))?;
        if self.garch.is_asymmetric() {
            return Err(invalid("garch", "the symmetric model cannot have asymmetric terms"));
        }
        self.gjr.validate().map_err(|e| invalid("gjr", e.to_string()))?;
        if !self.gjr.is_asymmetric() {
            return Err(invalid("gjr", "the asymmetric model needs o >= 1"));
        }
        self.mean.validate().map_err(|e| invalid("mean", e.to_string()))?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidConfig { field, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover defaults, partial JSON deserialization and
    // validation failures.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Defaults describe the S&P 500 analysis and validate.
    //
    // Given
    // -----
    // - `PipelineConfig::default()`.
    //
    // Expect
    // ------
    // - ^GSPC from 2010-01-01, α = 0.05, 30-day horizon, GARCH(1,1) vs
    //   GJR-GARCH(1,1,1); `validate` passes.
    fn defaults_are_valid() {
        let cfg = PipelineConfig::default();

        assert_eq!(cfg.ticker, "^GSPC");
        assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(cfg.alpha, 0.05);
        assert_eq!(cfg.horizon, 30);
        assert_eq!(cfg.gjr.to_string(), "GJR-GARCH(1,1,1)");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // A partial JSON document overrides only the fields it names.
    //
    // Given
    // -----
    // - JSON with ticker, start, dist and an ARIMA bound.
    //
    // Expect
    // ------
    // - Those fields set; everything else at its default.
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "ticker": "SPY",
            "start": "2015-06-01",
            "dist": "student_t",
            "arima": { "max_p": 2 }
        }"#;

        let cfg: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(cfg.ticker, "SPY");
        assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());
        assert_eq!(cfg.dist, Distribution::StudentT);
        assert_eq!(cfg.arima.max_p, 2);
        assert_eq!(cfg.arima.max_q, 3);
        assert_eq!(cfg.horizon, 30);
    }

    #[test]
    // Purpose
    // -------
    // Invalid settings are rejected with the field name.
    //
    // Given
    // -----
    // - alpha = 1.5; horizon = 0; a GJR spec in the symmetric slot; end
    //   before start.
    //
    // Expect
    // ------
    // - `InvalidConfig` naming alpha, horizon, garch and end.
    fn validation_names_the_field() {
        let field = |cfg: PipelineConfig| match cfg.validate() {
            Err(PipelineError::InvalidConfig { field, .. }) => field,
            other => panic!("expected InvalidConfig, got {other:?}"),
        };

        assert_eq!(field(PipelineConfig { alpha: 1.5, ..Default::default() }), "alpha");
        assert_eq!(field(PipelineConfig { horizon: 0, ..Default::default() }), "horizon");
        assert_eq!(
            field(PipelineConfig { garch: VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 }, ..Default::default() }),
            "garch"
        );
        assert_eq!(
            field(PipelineConfig { end: NaiveDate::from_ymd_opt(2009, 1, 1), ..Default::default() }),
            "end"
        );
    }
}
