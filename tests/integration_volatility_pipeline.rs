//! Integration tests for the volatility analysis pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end run: CSV prices with gaps, unit-root tests,
//!   auto-ARIMA, residual diagnostics, GARCH and GJR-GARCH fits, model
//!   comparison, forecast, exports and the JSON report.
//! - Check the methodological stop when log-returns are not stationary.
//! - Exercise the variance models on simulated leverage data with Student-t
//!   innovations, including the Student-t pipeline path.
//! - Check that estimates stay off the stationarity bound on well-specified
//!   data and that line-search aborts are not reported as convergence.
//!
//! Coverage
//! --------
//! - `pipeline::{Pipeline, PipelineConfig, render}` on offline data.
//! - `volatility::{simulate, fit_garch}` with t innovations.
//! - `optimization::loglik_optimizer::maximize` on a likelihood whose ascent
//!   direction leaves the admissible region.
//!
//! Exclusions
//! ----------
//! - Live downloads; the remote provider is only parsed in unit tests.
//! - Numerical building blocks (tests, transforms, covariance), which are
//!   covered by unit tests.
use chrono::{Datelike, NaiveDate, Weekday};
use ndarray::{Array1, array};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution as _, Normal};
use rust_volatility::{
    data::PriceSeries,
    mean_model::AutoArimaOptions,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, LogLikelihood, MLEOptions, Theta, maximize},
    },
    pipeline::{Pipeline, PipelineConfig, PipelineError, render},
    volatility::{
        BOUND_SLACK, Distribution, GarchFitOptions, GarchParams, GarchSpec, MeanSpec, SimOptions, VolatilitySpec,
        fit_garch, simulate,
    },
};
use std::{io::Write, path::PathBuf};

/// Purpose
/// -------
/// `n` consecutive weekdays starting at `start`.
fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = start;
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day = day.succ_opt().unwrap();
    }
    out
}

/// Purpose
/// -------
/// Percent returns from a GJR-GARCH(1,1,1) with a clear leverage effect.
///
/// Returns
/// -------
/// - `n` returns with μ = 0.04, ω = 0.02, α = 0.02, γ = 0.12, β = 0.9, so
///   the unconditional variance is 1 (%²).
fn leverage_returns(n: usize, seed: u64) -> Vec<f64> {
    let spec =
        GarchSpec::new(MeanSpec::Constant, VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 }, Distribution::Normal)
            .unwrap();
    let params = GarchParams::new(&spec, array![0.04], 0.02, array![0.02], array![0.12], array![0.9], None).unwrap();
    simulate(&spec, &params, n, &SimOptions { seed, burn: 500 }).unwrap().returns
}

/// Purpose
/// -------
/// Write a price CSV built from percent returns, with a few empty and
/// `null` rows that the loader must drop.
fn write_price_csv(path: &PathBuf, dates: &[NaiveDate], returns_pct: &[f64]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "Date,Open,Adj Close").unwrap();
    let mut price = 1000.0;
    writeln!(file, "{},{price},{price}", dates[0].format("%Y-%m-%d")).unwrap();
    for (i, r) in returns_pct.iter().enumerate() {
        price *= (r / 100.0).exp();
        writeln!(file, "{},{price},{price}", dates[i + 1].format("%Y-%m-%d")).unwrap();
    }
    let after = dates[dates.len() - 1];
    writeln!(file, "{},1.0,", after.succ_opt().unwrap().format("%Y-%m-%d")).unwrap();
    writeln!(file, "{},1.0,null", after.succ_opt().unwrap().succ_opt().unwrap().format("%Y-%m-%d")).unwrap();
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rust_volatility_it_{name}"))
}

#[test]
// Purpose
// -------
// Full run on a leverage-driven price path read from CSV.
//
// Given
// -----
// - 1500 simulated GJR returns compounded into prices, with two incomplete
//   trailing rows.
// - Export directory and JSON report enabled; ARIMA search up to (2, 2).
//
// Expect
// ------
// - Incomplete rows dropped; ARIMA's d agrees with the price ADF verdict.
// - Stationary returns, ARCH effects in the ARIMA residuals.
// - GJR γ̂ > 0, GJR preferred by AIC, 30-step forecast.
// - CSV exports, a parseable JSON report and a rendered narrative.
fn pipeline_runs_end_to_end_on_csv_prices() {
    // Arrange
    let returns = leverage_returns(1500, 2024);
    let dates = business_days(NaiveDate::from_ymd_opt(2015, 1, 5).unwrap(), returns.len() + 1);
    let csv_path = temp_path("prices.csv");
    write_price_csv(&csv_path, &dates, &returns);
    let export_dir = temp_path("exports");
    let report_path = temp_path("report.json");

    let config = PipelineConfig {
        csv: Some(csv_path.clone()),
        start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
        arima: AutoArimaOptions { max_p: 2, max_q: 2, ..Default::default() },
        export_dir: Some(export_dir.clone()),
        report_json: Some(report_path.clone()),
        ..Default::default()
    };

    // Act
    let report = Pipeline::run(config).unwrap();

    // Assert
    assert_eq!(report.data.n_prices, 1501);
    assert_eq!(report.returns.n, 1500);
    assert_eq!(report.arima.d == 0, report.price_stationarity.stationary);
    assert!(report.return_stationarity.stationary);
    assert!(report.residual_diagnostics.heteroskedastic);

    let gamma = report.gjr.coefficients.iter().find(|row| row.name == "gamma[1]").unwrap();
    assert!(gamma.estimate > 0.0);
    assert!(report.gjr.loglik >= report.garch.loglik - 1e-6);
    assert_eq!(report.comparison.preferred, "GJR-GARCH(1,1,1)");
    assert!(report.comparison.likelihood_ratio.is_some());

    let fc = &report.forecast.forecast;
    assert_eq!(report.forecast.model, "GJR-GARCH(1,1,1)");
    assert_eq!(fc.horizon(), 30);
    assert!(fc.variance.iter().all(|v| *v > 0.0));

    for name in ["prices.csv", "returns.csv", "arima_residuals.csv", "garch_volatility.csv", "gjr_volatility.csv"] {
        assert!(export_dir.join(name).exists(), "missing export {name}");
    }
    let forecast_csv = std::fs::read_to_string(export_dir.join("forecast.csv")).unwrap();
    assert_eq!(forecast_csv.lines().count(), 31);

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["forecast"]["horizon"], 30);
    assert_eq!(json["config"]["alpha"], 0.05);

    colored::control::set_override(false);
    let mut rendered = Vec::new();
    render(&report, &mut rendered).unwrap();
    let text = String::from_utf8(rendered).unwrap();
    assert!(text.contains("10. Model comparison"));
    assert!(text.contains("Preferred by AIC: GJR-GARCH(1,1,1)"));
}

#[test]
// Purpose
// -------
// The run stops before any variance fit when returns keep a unit root.
//
// Given
// -----
// - 400 prices whose daily log-returns drift upward linearly with tiny
//   noise, so the return series itself is non-stationary.
//
// Expect
// ------
// - `PipelineError::ReturnsNotStationary` with p ≥ α.
fn pipeline_refuses_nonstationary_returns() {
    // Arrange
    let n = 400;
    let dates = business_days(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(), n);
    let noise = Normal::new(0.0, 1e-6).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let mut log_price = 1000f64.ln();
    let rows = dates
        .iter()
        .enumerate()
        .map(|(t, date)| {
            log_price += 1e-5 * t as f64 + noise.sample(&mut rng);
            (*date, Some(log_price.exp()))
        })
        .collect();
    let prices = PriceSeries::new(rows).unwrap();
    let pipeline = Pipeline::new(PipelineConfig {
        start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
        arima: AutoArimaOptions { max_p: 1, max_q: 1, ..Default::default() },
        ..Default::default()
    })
    .unwrap();

    // Act
    let result = pipeline.analyze(&prices);

    // Assert
    match result {
        Err(PipelineError::ReturnsNotStationary { p_value, alpha, .. }) => assert!(p_value >= alpha),
        other => panic!("expected ReturnsNotStationary, got {other:?}"),
    }
}

#[test]
// Purpose
// -------
// Student-t GJR-GARCH recovers fat tails and leverage from simulated data.
//
// Given
// -----
// - 2500 draws from a t(6) GJR-GARCH(1,1,1) with γ = 0.15.
//
// Expect
// ------
// - 3 < ν̂ < 15, γ̂ > 0.05, finite robust standard errors, and a
//   converging forecast.
fn student_t_gjr_recovers_tails_and_leverage() {
    // Arrange
    let spec =
        GarchSpec::new(MeanSpec::Constant, VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 }, Distribution::StudentT)
            .unwrap();
    let truth =
        GarchParams::new(&spec, array![0.05], 0.05, array![0.03], array![0.15], array![0.85], Some(6.0)).unwrap();
    let path = simulate(&spec, &truth, 2500, &SimOptions { seed: 77, burn: 500 }).unwrap();

    // Act
    let fit = fit_garch(&path.returns, spec, &GarchFitOptions::default()).unwrap();
    let forecast = fit.forecast(250, 0.99).unwrap();

    // Assert
    let nu = fit.params.nu.unwrap();
    assert!(nu > 3.0 && nu < 15.0, "nu = {nu}");
    assert!(fit.params.gamma[0] > 0.05, "gamma = {}", fit.params.gamma[0]);
    assert!(fit.robust_std_errors.iter().all(|s| s.is_finite()));
    assert_eq!(fit.param_names().last().map(String::as_str), Some("nu"));
    assert!(!fit.on_stationarity_bound(), "persistence = {}", fit.persistence());
    let long_run = fit.unconditional_variance();
    assert!((forecast.variance[249] - long_run).abs() / long_run < 0.05);
    assert_eq!(forecast.volatility.len(), 250);
}

#[test]
// Purpose
// -------
// The Student-t run (`--dist t`) reports sane long-run quantities.
//
// Given
// -----
// - The leverage price path of the CSV run (unconditional variance 1 %²).
// - `dist = StudentT`, no exports.
//
// Expect
// ------
// - Both variance models carry a `nu` row and stay clear of the
//   stationarity bound.
// - Unconditional variances between 0.4 and 2.5 and finite half-lives.
// - A mean forecast annualized volatility below 40%.
fn pipeline_runs_with_student_t_innovations() {
    // Arrange
    let returns = leverage_returns(1500, 2024);
    let dates = business_days(NaiveDate::from_ymd_opt(2015, 1, 5).unwrap(), returns.len() + 1);
    let csv_path = temp_path("prices_t.csv");
    write_price_csv(&csv_path, &dates, &returns);
    let config = PipelineConfig {
        csv: Some(csv_path),
        start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
        arima: AutoArimaOptions { max_p: 1, max_q: 1, ..Default::default() },
        dist: Distribution::StudentT,
        ..Default::default()
    };

    // Act
    let report = Pipeline::run(config).unwrap();

    // Assert
    for summary in [&report.garch, &report.gjr] {
        assert!(summary.coefficients.iter().any(|row| row.name == "nu"), "{}", summary.model);
        assert!(summary.persistence < 1.0 - BOUND_SLACK, "{}: {}", summary.model, summary.persistence);
        assert!(
            summary.unconditional_variance > 0.4 && summary.unconditional_variance < 2.5,
            "{}: {}",
            summary.model,
            summary.unconditional_variance
        );
        assert!(summary.half_life.is_finite() && summary.half_life < 1000.0);
    }
    let annualized = report.forecast.forecast.mean_annualized_volatility();
    assert!(annualized > 0.0 && annualized < 40.0, "annualized = {annualized}");
}

#[test]
// Purpose
// -------
// Well-specified GARCH fits keep their persistence off the bound.
//
// Given
// -----
// - 2000 draws from a t(8) GARCH(1,1) with persistence 0.97.
// - Normal and Student-t GARCH(1,1) fits.
//
// Expect
// ------
// - Persistence below `1 − BOUND_SLACK` and within 0.04 of the truth for
//   both fits; the Student-t likelihood is not below the Normal one.
fn garch_persistence_stays_off_the_bound() {
    // Arrange
    let student =
        GarchSpec::new(MeanSpec::Constant, VolatilitySpec::Garch { p: 1, q: 1 }, Distribution::StudentT).unwrap();
    let normal = GarchSpec { dist: Distribution::Normal, ..student };
    let truth = GarchParams::new(&student, array![0.03], 0.03, array![0.1], Array1::zeros(0), array![0.87], Some(8.0))
        .unwrap();
    let path = simulate(&student, &truth, 2000, &SimOptions { seed: 31, burn: 500 }).unwrap();
    let opts = GarchFitOptions::default();

    // Act
    let t_fit = fit_garch(&path.returns, student, &opts).unwrap();
    let n_fit = fit_garch(&path.returns, normal, &opts).unwrap();

    // Assert
    for fit in [&t_fit, &n_fit] {
        assert!(fit.persistence() < 1.0 - BOUND_SLACK, "persistence = {}", fit.persistence());
        assert!((fit.persistence() - 0.97).abs() < 0.04, "persistence = {}", fit.persistence());
    }
    assert!(t_fit.loglik >= n_fit.loglik - 1e-6);
}

/// `ℓ(θ) = θ` on `θ ≤ 1e-3` and inadmissible beyond, so every ascent step
/// of the line search lands outside the model.
struct Ledge;

impl LogLikelihood for Ledge {
    type Data = ();

    fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
        if theta[0] > 1e-3 {
            return Err(OptError::NonPositiveVariance { index: 0, value: -theta[0] });
        }
        Ok(theta[0])
    }

    fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
        Ok(())
    }

    fn grad(&self, _: &Theta, _: &()) -> OptResult<Grad> {
        Ok(array![1.0])
    }
}

#[test]
// Purpose
// -------
// An optimizer run that ends in a line-search abort is not converged.
//
// Given
// -----
// - `Ledge` started at θ = 0 with default options.
//
// Expect
// ------
// - `converged == false` with a `SolverExit` status and θ̂ still admissible.
fn line_search_abort_is_not_convergence() {
    // Act
    let out = maximize(&Ledge, array![0.0], &(), &MLEOptions::default()).unwrap();

    // Assert
    assert!(!out.converged, "{}", out.status);
    assert!(out.line_search_aborted(), "{}", out.status);
    assert!(out.theta_hat[0] <= 1e-3);
}
