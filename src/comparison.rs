//! comparison — information criteria and likelihood-ratio tests.
//!
//! Purpose
//! -------
//! Rank fitted models estimated on the same sample and test nested
//! specifications against each other.
//!
//! Key behaviors
//! -------------
//! - [`aic`] `= −2ℓ + 2k` and [`bic`] `= −2ℓ + k ln n`.
//! - [`ModelComparison`]: a table of [`ModelEntry`] rows with
//!   [`preferred`](ModelComparison::preferred) (smallest criterion; ties keep
//!   the first, more parsimonious entry) and per-row deltas.
//! - [`likelihood_ratio`]: `LR = 2(ℓ_u − ℓ_r)` referred to χ²(k_u − k_r).
//!
//! Invariants & assumptions
//! ------------------------
//! - All entries share one estimation sample size; mixing samples is an
//!   error because criteria are then not comparable.
//! - When the restriction sits on the parameter boundary (e.g. `γ = 0` in
//!   GJR-GARCH) the χ² reference is conservative.
use crate::statistical_tests::{distributions::chi2_sf, errors::TestError};
use serde::{Deserialize, Serialize};

pub type ComparisonResult<T> = Result<T, ComparisonError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonError {
    /// No models to compare.
    Empty,
    /// Entries were estimated on different sample sizes.
    SampleMismatch { first: usize, other: usize },
    /// The unrestricted model must have strictly more parameters.
    NotNested { restricted: usize, unrestricted: usize },
    /// Reference distribution failure.
    Test(TestError),
}

impl std::error::Error for ComparisonError {}

impl std::fmt::Display for ComparisonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonError::Empty => write!(f, "No models to compare"),
            ComparisonError::SampleMismatch { first, other } => write!(
                f,
                "Models were fitted on different samples ({first} vs {other} observations)"
            ),
            ComparisonError::NotNested { restricted, unrestricted } => write!(
                f,
                "Unrestricted model ({unrestricted} params) must have more parameters than the restricted one ({restricted})"
            ),
            ComparisonError::Test(err) => write!(f, "{err}"),
        }
    }
}

impl From<TestError> for ComparisonError {
    fn from(err: TestError) -> Self {
        ComparisonError::Test(err)
    }
}

/// Information criterion used for model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    #[default]
    Aic,
    Bic,
}

impl Criterion {
    pub fn of(&self, entry: &ModelEntry) -> f64 {
        match self {
            Criterion::Aic => entry.aic,
            Criterion::Bic => entry.bic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Aic => "AIC",
            Criterion::Bic => "BIC",
        }
    }
}

impl std::str::FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aic" => Ok(Criterion::Aic),
            "bic" => Ok(Criterion::Bic),
            other => Err(format!("unknown criterion '{other}', expected 'aic' or 'bic'")),
        }
    }
}

pub fn aic(loglik: f64, n_params: usize) -> f64 {
    -2.0 * loglik + 2.0 * n_params as f64
}

pub fn bic(loglik: f64, n_params: usize, nobs: usize) -> f64 {
    -2.0 * loglik + n_params as f64 * (nobs as f64).ln()
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEntry {
    pub name: String,
    pub loglik: f64,
    pub n_params: usize,
    pub nobs: usize,
    pub aic: f64,
    pub bic: f64,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, loglik: f64, n_params: usize, nobs: usize) -> Self {
        ModelEntry {
            name: name.into(),
            loglik,
            n_params,
            nobs,
            aic: aic(loglik, n_params),
            bic: bic(loglik, n_params, nobs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    entries: Vec<ModelEntry>,
}

impl ModelComparison {
    /// Build a comparison table.
    ///
    /// Errors
    /// ------
    /// - `ComparisonError::Empty` for no entries.
    /// - `ComparisonError::SampleMismatch` if sample sizes differ.
    pub fn new(entries: Vec<ModelEntry>) -> ComparisonResult<Self> {
        let first = entries.first().ok_or(ComparisonError::Empty)?.nobs;
        if let Some(other) = entries.iter().find(|e| e.nobs != first) {
            return Err(ComparisonError::SampleMismatch { first, other: other.nobs });
        }
        Ok(ModelComparison { entries })
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Entry with the smallest criterion value; the first wins ties.
    pub fn preferred(&self, criterion: Criterion) -> &ModelEntry {
        let mut best = &self.entries[0];
        for entry in &self.entries[1..] {
            if criterion.of(entry) < criterion.of(best) {
                best = entry;
            }
        }
        best
    }

    /// Criterion value minus the best value, per entry.
    pub fn deltas(&self, criterion: Criterion) -> Vec<f64> {
        let best = criterion.of(self.preferred(criterion));
        self.entries.iter().map(|e| criterion.of(e) - best).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LikelihoodRatio {
    pub stat: f64,
    pub dof: usize,
    pub p_value: f64,
}

/// Likelihood-ratio test of a restricted model nested in an unrestricted one.
///
/// Errors
/// ------
/// - `ComparisonError::NotNested` unless `k_u > k_r`.
/// - `ComparisonError::SampleMismatch` if sample sizes differ.
pub fn likelihood_ratio(
    restricted: &ModelEntry, unrestricted: &ModelEntry,
) -> ComparisonResult<LikelihoodRatio> {
    if unrestricted.n_params <= restricted.n_params {
        return Err(ComparisonError::NotNested {
            restricted: restricted.n_params,
            unrestricted: unrestricted.n_params,
        });
    }
    if unrestricted.nobs != restricted.nobs {
        return Err(ComparisonError::SampleMismatch {
            first: restricted.nobs,
            other: unrestricted.nobs,
        });
    }
    let stat = (2.0 * (unrestricted.loglik - restricted.loglik)).max(0.0);
    let dof = unrestricted.n_params - restricted.n_params;
    Ok(LikelihoodRatio { stat, dof, p_value: chi2_sf(stat, dof as f64)? })
}
