//! The ten-stage analysis.
//!
//! Stages run strictly in order, each logging one `info!` event:
//! prices → ADF(prices) → auto-ARIMA → residual diagnostics → log-returns →
//! ADF(returns) → GARCH → sign bias → GJR-GARCH → comparison → forecast.
//! The variance stages only run once the returns have rejected a unit root.
use crate::{
    comparison::{ModelComparison, likelihood_ratio},
    data::{
        errors::DataError,
        export::{write_dated, write_series},
        series::{LogReturns, PriceSeries},
        source::{YahooSource, load_csv},
    },
    mean_model::{auto::AutoArimaOptions, auto_arima, fit::ArimaFit},
    pipeline::{
        config::PipelineConfig,
        errors::{PipelineError, PipelineResult},
        report::{
            AnalysisReport, ArimaSummary, AsymmetryCheck, ComparisonSummary, DataSummary, ForecastSummary,
            ResidualDiagnostics, ReturnsSummary, StationarityCheck, VolatilitySummary,
        },
    },
    statistical_tests::{
        AdfLag, AdfOutcome, AdfRegression, ArchLmOutcome, LjungBoxOutcome, SignBiasOutcome, TestOutcome,
    },
    volatility::{
        fit::{GarchFit, fit_garch},
        forecast::{TRADING_DAYS, VolatilityForecast},
        spec::GarchSpec,
    },
};
use std::path::Path;
use tracing::{debug, info, warn};

/// A validated configuration ready to run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// # Errors
    /// - [`PipelineError::InvalidConfig`] from [`PipelineConfig::validate`].
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load prices and run every stage.
    pub fn run(config: PipelineConfig) -> PipelineResult<AnalysisReport> {
        let pipeline = Pipeline::new(config)?;
        let prices = pipeline.load_prices()?;
        pipeline.analyze(&prices)
    }

    /// Prices from the configured CSV, or from the remote provider.
    ///
    /// CSV input is restricted to the `[start, end]` window like a download.
    pub fn load_prices(&self) -> PipelineResult<PriceSeries> {
        let cfg = &self.config;
        match &cfg.csv {
            Some(path) => {
                let all = load_csv(path, &cfg.csv_date_column, &cfg.csv_price_column)?;
                let rows = all
                    .dates()
                    .iter()
                    .zip(all.prices())
                    .filter(|(date, _)| **date >= cfg.start && cfg.end.map_or(true, |end| **date <= end))
                    .map(|(date, price)| (*date, Some(*price)))
                    .collect();
                Ok(PriceSeries::new(rows)?)
            }
            None => Ok(YahooSource::new()?.fetch(&cfg.ticker, cfg.start, cfg.end)?),
        }
    }

    /// Run stages 1–11 on `prices`.
    ///
    /// # Errors
    /// - [`PipelineError::ReturnsNotStationary`] when the returns keep a
    ///   unit root at `alpha`.
    /// - Any stage error, converted into [`PipelineError`].
    pub fn analyze(&self, prices: &PriceSeries) -> PipelineResult<AnalysisReport> {
        let cfg = &self.config;
        let alpha = cfg.alpha;

        // 1. Data
        let data = DataSummary {
            source: match &cfg.csv {
                Some(path) => path.display().to_string(),
                None => cfg.ticker.clone(),
            },
            first_date: prices.first_date().ok_or(DataError::InsufficientRows { needed: 2, found: 0 })?,
            last_date: prices.last_date().ok_or(DataError::InsufficientRows { needed: 2, found: 0 })?,
            n_prices: prices.len(),
            first_price: prices.prices()[0],
            last_price: prices.prices()[prices.len() - 1],
        };
        info!(stage = 1, rows = data.n_prices, from = %data.first_date, to = %data.last_date, "prices loaded");

        // 2. Stationarity of prices
        let price_stationarity = stationarity("prices", prices.prices(), alpha)?;
        info!(
            stage = 2,
            stat = price_stationarity.adf.statistic(),
            p_value = price_stationarity.adf.p_value(),
            stationary = price_stationarity.stationary,
            "ADF on prices"
        );

        // 3. Auto-ARIMA
        let arima_opts = AutoArimaOptions { alpha, ..cfg.arima.clone() };
        let auto = auto_arima(prices.prices(), &arima_opts)?;
        let arima_forecast = auto.fit.forecast(cfg.horizon, 1.0 - alpha)?;
        info!(stage = 3, model = %auto.fit.spec.order, aic = auto.fit.aic, candidates = auto.candidates.len(), "mean model selected");
        let arima = ArimaSummary {
            order: auto.fit.spec.order.to_string(),
            d: auto.d,
            criterion: auto.criterion,
            candidates: auto.candidates.len(),
            coefficients: auto.fit.coef_table(),
            sigma2: auto.fit.sigma2,
            loglik: auto.fit.loglik,
            aic: auto.fit.aic,
            bic: auto.fit.bic,
            nobs: auto.fit.nobs,
            converged: auto.fit.converged(),
            forecast: arima_forecast,
        };

        // 4. Residual diagnostics
        let resid = auto.fit.residuals.to_vec();
        let order = auto.fit.spec.order;
        let model_df = (order.p + order.q).min(cfg.ljung_box_lags - 1);
        let ljung_box = LjungBoxOutcome::ljung_box(&resid, cfg.ljung_box_lags, model_df)?;
        let arch_lm = ArchLmOutcome::arch_lm(&resid, cfg.arch_lm_lags)?;
        let residual_diagnostics = ResidualDiagnostics {
            autocorrelated: ljung_box.rejects_null(alpha),
            heteroskedastic: arch_lm.rejects_null(alpha),
            ljung_box,
            arch_lm,
        };
        info!(
            stage = 4,
            ljung_box_p = residual_diagnostics.ljung_box.p_value(),
            arch_lm_p = residual_diagnostics.arch_lm.p_value(),
            "ARIMA residual diagnostics"
        );

        // 5. Log-returns
        let log_returns = prices.log_returns()?;
        let returns = ReturnsSummary {
            n: log_returns.len(),
            mean: log_returns.mean(),
            std_dev: log_returns.std_dev(),
            annualized_volatility: log_returns.std_dev() * TRADING_DAYS.sqrt(),
            scale: cfg.return_scale,
        };
        info!(stage = 5, n = returns.n, mean = returns.mean, std_dev = returns.std_dev, "log-returns computed");

        // 6. Stationarity of returns
        let return_stationarity = stationarity("log-returns", log_returns.values(), alpha)?;
        info!(
            stage = 6,
            stat = return_stationarity.adf.statistic(),
            p_value = return_stationarity.adf.p_value(),
            stationary = return_stationarity.stationary,
            "ADF on log-returns"
        );
        if !return_stationarity.stationary {
            return Err(PipelineError::ReturnsNotStationary {
                stat: return_stationarity.adf.statistic(),
                p_value: return_stationarity.adf.p_value(),
                alpha,
            });
        }

        // 7. Symmetric variance model
        let y = log_returns.scaled(cfg.return_scale);
        let garch_spec = GarchSpec::new(cfg.mean, cfg.garch, cfg.dist)?;
        let garch_fit = fit_garch(&y, garch_spec, &cfg.garch_fit)?;
        let garch = volatility_summary(&garch_fit, alpha, cfg.arch_lm_lags)?;
        info!(stage = 7, model = %garch.model, loglik = garch.loglik, persistence = garch.persistence, "variance model fitted");

        // 8. Asymmetry
        let sign_bias = SignBiasOutcome::sign_bias(&garch_fit.std_resid.to_vec())?;
        let leverage_detected = sign_bias.rejects_null(alpha)
            || [sign_bias.sign_bias_test(), sign_bias.negative_size_bias(), sign_bias.positive_size_bias()]
                .iter()
                .any(|t| t.p_value < alpha);
        let asymmetry = AsymmetryCheck { sign_bias, leverage_detected };
        info!(stage = 8, joint_p = asymmetry.sign_bias.p_value(), leverage_detected, "sign-bias diagnostics");

        // 9. Asymmetric variance model
        let gjr_spec = GarchSpec::new(cfg.mean, cfg.gjr, cfg.dist)?;
        let gjr_fit = fit_garch(&y, gjr_spec, &cfg.garch_fit)?;
        let gjr = volatility_summary(&gjr_fit, alpha, cfg.arch_lm_lags)?;
        info!(stage = 9, model = %gjr.model, loglik = gjr.loglik, persistence = gjr.persistence, "variance model fitted");

        // 10. Comparison
        let comparison = compare(&garch_fit, &gjr_fit, cfg)?;
        info!(stage = 10, criterion = comparison.criterion.label(), preferred = %comparison.preferred, "models compared");

        // 11. Forecast
        let chosen = if comparison.preferred == gjr_fit.spec.label() { &gjr_fit } else { &garch_fit };
        let vol_forecast = chosen.forecast(cfg.horizon, cfg.var_level)?;
        info!(
            stage = 11,
            model = %chosen.spec.label(),
            horizon = cfg.horizon,
            mean_annual_vol = vol_forecast.mean_annualized_volatility(),
            "forecast produced"
        );

        if let Some(dir) = &cfg.export_dir {
            export_series(dir, prices, &log_returns, &auto.fit, &garch_fit, &gjr_fit, &vol_forecast)?;
        }

        let report = AnalysisReport {
            config: cfg.clone(),
            data,
            price_stationarity,
            arima,
            residual_diagnostics,
            returns,
            return_stationarity,
            garch,
            asymmetry,
            gjr,
            comparison,
            forecast: ForecastSummary {
                model: chosen.spec.label(),
                horizon: cfg.horizon,
                scale: cfg.return_scale,
                forecast: vol_forecast,
            },
        };
        if let Some(path) = &cfg.report_json {
            report.write_json(path)?;
            info!(path = %path.display(), "report written");
        }
        Ok(report)
    }
}

fn stationarity(series: &str, values: &[f64], alpha: f64) -> PipelineResult<StationarityCheck> {
    let adf = AdfOutcome::adf(values, AdfRegression::Constant, AdfLag::default())?;
    Ok(StationarityCheck { series: series.to_string(), stationary: adf.rejects_null(alpha), adf })
}

fn volatility_summary(fit: &GarchFit, alpha: f64, arch_lags: usize) -> PipelineResult<VolatilitySummary> {
    if !fit.converged() {
        warn!(model = %fit.spec.label(), "reporting a variance model that did not converge");
    }
    let remaining_arch = ArchLmOutcome::arch_lm(&fit.std_resid.to_vec(), arch_lags)?;
    Ok(VolatilitySummary {
        model: fit.spec.label(),
        distribution: fit.spec.dist.label().to_string(),
        coefficients: fit.robust_coef_table(),
        loglik: fit.loglik,
        aic: fit.aic,
        bic: fit.bic,
        nobs: fit.nobs,
        persistence: fit.persistence(),
        half_life: fit.half_life(),
        unconditional_variance: fit.unconditional_variance(),
        annualized_volatility: (TRADING_DAYS * fit.unconditional_variance()).sqrt(),
        converged: fit.converged(),
        remaining_arch_detected: remaining_arch.rejects_null(alpha),
        remaining_arch,
    })
}

fn compare(garch: &GarchFit, gjr: &GarchFit, cfg: &PipelineConfig) -> PipelineResult<ComparisonSummary> {
    let restricted = garch.model_entry(garch.spec.label());
    let unrestricted = gjr.model_entry(gjr.spec.label());
    let nested = gjr.spec.vol.p() >= garch.spec.vol.p() && gjr.spec.vol.q() >= garch.spec.vol.q();
    let lr = if nested {
        match likelihood_ratio(&restricted, &unrestricted) {
            Ok(lr) => Some(lr),
            Err(err) => {
                debug!(error = %err, "likelihood-ratio test skipped");
                None
            }
        }
    } else {
        None
    };
    let table = ModelComparison::new(vec![restricted, unrestricted])?;
    let preferred = table.preferred(cfg.criterion).name.clone();
    let deltas = table.deltas(cfg.criterion);
    Ok(ComparisonSummary { table, criterion: cfg.criterion, preferred, deltas, likelihood_ratio: lr })
}

fn export_series(
    dir: &Path, prices: &PriceSeries, returns: &LogReturns, arima: &ArimaFit, garch: &GarchFit,
    gjr: &GarchFit, forecast: &VolatilityForecast,
) -> PipelineResult<()> {
    std::fs::create_dir_all(dir).map_err(DataError::from)?;

    write_dated(dir.join("prices.csv"), &["date", "price"], prices.dates(), &[prices.prices()])?;
    write_dated(dir.join("returns.csv"), &["date", "log_return"], returns.dates(), &[returns.values()])?;

    let resid = arima.residuals.to_vec();
    let offset = arima.resid_offset();
    write_dated(
        dir.join("arima_residuals.csv"),
        &["date", "residual"],
        &prices.dates()[offset..],
        &[resid.as_slice()],
    )?;

    for (name, fit) in [("garch_volatility.csv", garch), ("gjr_volatility.csv", gjr)] {
        let burn = fit.spec.mean.burn();
        let vol = fit.conditional_volatility().to_vec();
        let std_resid = fit.std_resid.to_vec();
        write_dated(
            dir.join(name),
            &["date", "volatility", "std_resid"],
            &returns.dates()[burn..],
            &[vol.as_slice(), std_resid.as_slice()],
        )?;
    }

    let rows = (0..forecast.horizon()).map(|h| {
        vec![
            (h + 1).to_string(),
            forecast.mean[h].to_string(),
            forecast.variance[h].to_string(),
            forecast.volatility[h].to_string(),
            forecast.annualized_volatility[h].to_string(),
            forecast.cumulative_volatility[h].to_string(),
            forecast.value_at_risk[h].to_string(),
        ]
    });
    write_series(
        dir.join("forecast.csv"),
        &["step", "mean", "variance", "volatility", "annualized_volatility", "cumulative_volatility", "value_at_risk"],
        rows,
    )?;
    info!(dir = %dir.display(), "chart series exported");
    Ok(())
}
