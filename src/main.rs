//! Command-line entry point of the volatility analysis.
//!
//! ```text
//! rust_volatility --ticker ^GSPC --start 2010-01-01 --dist t --export-dir out/
//! rust_volatility --csv data/sp500.csv --report-json report.json
//! ```
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use rust_volatility::{
    comparison::Criterion,
    pipeline::{Pipeline, PipelineConfig, render},
    volatility::spec::Distribution,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Unit-root, ARIMA and GARCH/GJR-GARCH volatility analysis")]
struct Args {
    /// Ticker symbol to download (ignored with --csv)
    #[arg(short, long)]
    ticker: Option<String>,

    /// First date of the sample (YYYY-MM-DD)
    #[arg(short, long)]
    start: Option<NaiveDate>,

    /// Last date of the sample (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    end: Option<NaiveDate>,

    /// Read prices from a CSV file with Date and Adj Close columns
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON configuration file; command-line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Significance level for every test decision
    #[arg(short, long)]
    alpha: Option<f64>,

    /// Forecast horizon in trading days
    #[arg(short = 'H', long)]
    horizon: Option<usize>,

    /// Innovation distribution: normal or t
    #[arg(short, long)]
    dist: Option<Distribution>,

    /// Model selection criterion: aic or bic
    #[arg(long)]
    criterion: Option<Criterion>,

    /// Directory for chart-ready CSV exports
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(ticker) = self.ticker {
            config.ticker = ticker;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if self.end.is_some() {
            config.end = self.end;
        }
        if self.csv.is_some() {
            config.csv = self.csv;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(dist) = self.dist {
            config.dist = dist;
        }
        if let Some(criterion) = self.criterion {
            config.criterion = criterion;
        }
        if self.export_dir.is_some() {
            config.export_dir = self.export_dir;
        }
        if self.report_json.is_some() {
            config.report_json = self.report_json;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level: tracing::Level =
        args.log_level.parse().map_err(|e| anyhow!("invalid --log-level '{}': {e}", args.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).with_target(false).with_writer(std::io::stderr).init();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut config);

    let report = Pipeline::run(config).context("volatility analysis failed")?;
    render(&report, &mut std::io::stdout().lock())?;
    Ok(())
}
