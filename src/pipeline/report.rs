//! Structured results of a run and their console rendering.
//!
//! [`AnalysisReport`] is the serializable record of every stage;
//! [`render`] turns it into the colored console narrative, interpreting
//! each test at the configured `alpha`.
use crate::{
    comparison::{Criterion, LikelihoodRatio, ModelComparison},
    inference::CoefRow,
    mean_model::forecast::ArimaForecast,
    pipeline::{
        config::PipelineConfig,
        errors::{PipelineError, PipelineResult},
    },
    statistical_tests::{AdfOutcome, ArchLmOutcome, LjungBoxOutcome, SignBiasOutcome, TestOutcome},
    volatility::forecast::VolatilityForecast,
};
use chrono::NaiveDate;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::{io::Write, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub source: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub n_prices: usize,
    pub first_price: f64,
    pub last_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityCheck {
    pub series: String,
    pub adf: AdfOutcome,
    /// Unit root rejected at `alpha`.
    pub stationary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaSummary {
    pub order: String,
    pub d: usize,
    pub criterion: Criterion,
    pub candidates: usize,
    pub coefficients: Vec<CoefRow>,
    pub sigma2: f64,
    pub loglik: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
    pub converged: bool,
    pub forecast: ArimaForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualDiagnostics {
    pub ljung_box: LjungBoxOutcome,
    pub autocorrelated: bool,
    pub arch_lm: ArchLmOutcome,
    pub heteroskedastic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsSummary {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// `√252 · std_dev`, in return units.
    pub annualized_volatility: f64,
    /// Factor applied before variance fitting.
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilitySummary {
    pub model: String,
    pub distribution: String,
    /// Estimates with robust standard errors.
    pub coefficients: Vec<CoefRow>,
    pub loglik: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
    pub persistence: f64,
    pub half_life: f64,
    pub unconditional_variance: f64,
    /// `√(252 · unconditional variance)`, in scaled return units.
    pub annualized_volatility: f64,
    pub converged: bool,
    /// ARCH-LM on the standardized residuals.
    pub remaining_arch: ArchLmOutcome,
    pub remaining_arch_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsymmetryCheck {
    pub sign_bias: SignBiasOutcome,
    /// Joint or any individual bias test rejects at `alpha`.
    pub leverage_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub table: ModelComparison,
    pub criterion: Criterion,
    pub preferred: String,
    pub deltas: Vec<f64>,
    /// Symmetric model nested in the asymmetric one.
    pub likelihood_ratio: Option<LikelihoodRatio>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub model: String,
    pub horizon: usize,
    /// Forecast units are returns times this factor.
    pub scale: f64,
    pub forecast: VolatilityForecast,
}

/// Everything a run produced, stage by stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub config: PipelineConfig,
    pub data: DataSummary,
    pub price_stationarity: StationarityCheck,
    pub arima: ArimaSummary,
    pub residual_diagnostics: ResidualDiagnostics,
    pub returns: ReturnsSummary,
    pub return_stationarity: StationarityCheck,
    pub garch: VolatilitySummary,
    pub asymmetry: AsymmetryCheck,
    pub gjr: VolatilitySummary,
    pub comparison: ComparisonSummary,
    pub forecast: ForecastSummary,
}

impl AnalysisReport {
    /// Pretty-printed JSON of the whole report.
    ///
    /// # Errors
    /// - [`PipelineError::Report`] on serialization or I/O failure.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| PipelineError::Report(e.to_string()))?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| PipelineError::Report(format!("{}: {e}", path.as_ref().display())))
    }
}

/// Print the console narrative of `report` to `out`.
pub fn render<W: Write>(report: &AnalysisReport, out: &mut W) -> std::io::Result<()> {
    let alpha = report.config.alpha;

    writeln!(out, "{}", "=".repeat(72).blue())?;
    writeln!(out, "{}", format!("Volatility analysis of {}", report.data.source).bold().blue())?;
    writeln!(out, "{}", "=".repeat(72).blue())?;

    // 1. Data
    let d = &report.data;
    section(out, "1. Data")?;
    writeln!(
        out,
        "{} {} prices from {} to {} ({:.2} -> {:.2})",
        "Loaded:".green(),
        d.n_prices,
        d.first_date,
        d.last_date,
        d.first_price,
        d.last_price
    )?;

    // 2. Prices
    section(out, "2. Stationarity of prices (ADF)")?;
    adf_block(out, &report.price_stationarity, alpha)?;

    // 3. ARIMA
    let a = &report.arima;
    section(out, "3. Mean model (auto-ARIMA)")?;
    writeln!(
        out,
        "Selected {} by {} among {} candidates (d = {})",
        a.order.bold(),
        a.criterion.label(),
        a.candidates,
        a.d
    )?;
    coef_block(out, &a.coefficients)?;
    writeln!(
        out,
        "sigma2 = {:.4}  loglik = {:.2}  AIC = {:.2}  BIC = {:.2}  n = {}",
        a.sigma2, a.loglik, a.aic, a.bic, a.nobs
    )?;
    if !a.converged {
        writeln!(out, "{}", "warning: optimizer did not report convergence".yellow())?;
    }
    if let (Some(first), Some(last)) = (a.forecast.mean.first(), a.forecast.mean.last()) {
        writeln!(
            out,
            "Price forecast: {:.2} (h=1) -> {:.2} (h={}), {:.0}% band at h={}: [{:.2}, {:.2}]",
            first,
            last,
            a.forecast.horizon(),
            100.0 * a.forecast.level,
            a.forecast.horizon(),
            a.forecast.lower.last().copied().unwrap_or(f64::NAN),
            a.forecast.upper.last().copied().unwrap_or(f64::NAN)
        )?;
    }

    // 4. Residual diagnostics
    let r = &report.residual_diagnostics;
    section(out, "4. ARIMA residual diagnostics")?;
    writeln!(
        out,
        "Ljung-Box({}): Q = {:.3}, p = {:.4} - {}",
        r.ljung_box.lags(),
        r.ljung_box.statistic(),
        r.ljung_box.p_value(),
        verdict(r.autocorrelated, "autocorrelation remains", "no remaining autocorrelation")
    )?;
    writeln!(
        out,
        "ARCH-LM({}): LM = {:.3}, p = {:.4} - {}",
        r.arch_lm.lags(),
        r.arch_lm.statistic(),
        r.arch_lm.p_value(),
        verdict(r.heteroskedastic, "ARCH effects detected", "no ARCH effects")
    )?;
    if r.heteroskedastic {
        writeln!(out, "Conditional heteroskedasticity motivates a variance model.")?;
    }

    // 5. Returns
    let ret = &report.returns;
    section(out, "5. Log-returns")?;
    writeln!(
        out,
        "n = {}  mean = {:.6}  std = {:.6}  annualized vol = {:.2}%",
        ret.n,
        ret.mean,
        ret.std_dev,
        100.0 * ret.annualized_volatility
    )?;

    // 6. Returns stationarity
    section(out, "6. Stationarity of log-returns (ADF)")?;
    adf_block(out, &report.return_stationarity, alpha)?;

    // 7. GARCH
    section(out, &format!("7. {}", report.garch.model))?;
    volatility_block(out, &report.garch, alpha)?;

    // 8. Asymmetry
    let s = &report.asymmetry.sign_bias;
    section(out, "8. Asymmetry diagnostics (sign bias)")?;
    for (label, test) in [
        ("Sign bias", s.sign_bias_test()),
        ("Negative size bias", s.negative_size_bias()),
        ("Positive size bias", s.positive_size_bias()),
    ] {
        writeln!(out, "{label:<20} t = {:>8.3}  p = {:.4}", test.t_stat, test.p_value)?;
    }
    writeln!(
        out,
        "{:<20} stat = {:>5.3}  p = {:.4} - {}",
        "Joint effect",
        s.statistic(),
        s.p_value(),
        verdict(report.asymmetry.leverage_detected, "leverage effect detected", "no asymmetry detected")
    )?;

    // 9. GJR
    section(out, &format!("9. {}", report.gjr.model))?;
    volatility_block(out, &report.gjr, alpha)?;

    // 10. Comparison
    let c = &report.comparison;
    section(out, "10. Model comparison")?;
    writeln!(out, "{:<20} {:>12} {:>4} {:>12} {:>12} {:>10}", "Model", "loglik", "k", "AIC", "BIC", "delta")?;
    for (entry, delta) in c.table.entries().iter().zip(&c.deltas) {
        writeln!(
            out,
            "{:<20} {:>12.2} {:>4} {:>12.2} {:>12.2} {:>10.2}",
            entry.name, entry.loglik, entry.n_params, entry.aic, entry.bic, delta
        )?;
    }
    writeln!(out, "Preferred by {}: {}", c.criterion.label(), c.preferred.bold().green())?;
    if let Some(lr) = &c.likelihood_ratio {
        writeln!(
            out,
            "LR test: stat = {:.3}, df = {}, p = {:.4} - {}",
            lr.stat,
            lr.dof,
            lr.p_value,
            verdict(lr.p_value < alpha, "asymmetric terms significant", "asymmetric terms not significant")
        )?;
    }

    // 11. Forecast
    let f = &report.forecast;
    section(out, &format!("11. {}-day forecast ({})", f.horizon, f.model))?;
    writeln!(
        out,
        "{:>4} {:>10} {:>10} {:>12} {:>12} {:>10}",
        "h",
        "mean",
        "vol",
        "annual vol",
        "cum. vol",
        format!("VaR {:.0}%", 100.0 * f.forecast.var_level)
    )?;
    let fc = &f.forecast;
    for h in 0..fc.horizon() {
        writeln!(
            out,
            "{:>4} {:>10.4} {:>10.4} {:>12.4} {:>12.4} {:>10.4}",
            h + 1,
            fc.mean[h],
            fc.volatility[h],
            fc.annualized_volatility[h],
            fc.cumulative_volatility[h],
            fc.value_at_risk[h]
        )?;
    }
    writeln!(
        out,
        "Average annualized volatility over the horizon: {:.2}",
        fc.mean_annualized_volatility()
    )?;
    Ok(())
}

fn section<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    writeln!(out, "\n{}", title.bold())?;
    writeln!(out, "{}", "-".repeat(48))
}

fn verdict(flag: bool, yes: &str, no: &str) -> ColoredString {
    if flag { yes.yellow() } else { no.green() }
}

fn adf_block<W: Write>(out: &mut W, check: &StationarityCheck, alpha: f64) -> std::io::Result<()> {
    let adf = &check.adf;
    let cv = adf.critical_values();
    writeln!(
        out,
        "ADF on {}: stat = {:.4}, p = {:.4}, lags = {}, n = {}",
        check.series,
        adf.statistic(),
        adf.p_value(),
        adf.used_lag(),
        adf.nobs()
    )?;
    writeln!(out, "Critical values: 1% {:.3}  5% {:.3}  10% {:.3}", cv.one_pct, cv.five_pct, cv.ten_pct)?;
    let text = if check.stationary {
        format!("unit root rejected at {alpha}: stationary").green()
    } else {
        format!("unit root not rejected at {alpha}: non-stationary").yellow()
    };
    writeln!(out, "{text}")
}

fn coef_block<W: Write>(out: &mut W, rows: &[CoefRow]) -> std::io::Result<()> {
    writeln!(out, "{:<12} {:>12} {:>12} {:>10} {:>10}", "param", "estimate", "std err", "z", "p")?;
    for row in rows {
        writeln!(
            out,
            "{:<12} {:>12.6} {:>12.6} {:>10.3} {:>10.4}",
            row.name, row.estimate, row.std_error, row.z_stat, row.p_value
        )?;
    }
    Ok(())
}

fn volatility_block<W: Write>(out: &mut W, v: &VolatilitySummary, alpha: f64) -> std::io::Result<()> {
    writeln!(out, "Innovations: {}; robust standard errors", v.distribution)?;
    coef_block(out, &v.coefficients)?;
    writeln!(
        out,
        "loglik = {:.2}  AIC = {:.2}  BIC = {:.2}  n = {}",
        v.loglik, v.aic, v.bic, v.nobs
    )?;
    writeln!(
        out,
        "persistence = {:.4}  half-life = {:.1} days  long-run annual vol = {:.2}",
        v.persistence, v.half_life, v.annualized_volatility
    )?;
    if !v.converged {
        writeln!(out, "{}", "warning: optimizer did not report convergence".yellow())?;
    }
    writeln!(
        out,
        "ARCH-LM on standardized residuals: p = {:.4} - {}",
        v.remaining_arch.p_value(),
        verdict(
            v.remaining_arch.rejects_null(alpha),
            "ARCH effects remain",
            "variance dynamics captured"
        )
    )
}
