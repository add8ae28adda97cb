//! Specifications of the GARCH family: mean, variance and innovation law.
//!
//! Order convention: `p` ARCH lags (α on `ε²`), `o` asymmetric lags (γ on
//! `I[ε<0] ε²`) and `q` GARCH lags (β on `σ²`). `Garch { p, q }` is the
//! symmetric special case `o = 0`.
//!
//! Parameters are laid out as `[mean…, ω, α…, γ…, β…, ν?]` both in model
//! space and in the optimizer vector.
use crate::volatility::errors::{GarchError, GarchResult};
use serde::{Deserialize, Serialize};

/// Largest ARCH, asymmetric or GARCH order accepted.
pub const MAX_VOL_ORDER: usize = 5;
/// Largest AR order of the conditional mean.
pub const MAX_AR_MEAN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum VolatilitySpec {
    Garch { p: usize, q: usize },
    GjrGarch { p: usize, o: usize, q: usize },
}

impl VolatilitySpec {
    pub fn p(&self) -> usize {
        match *self {
            VolatilitySpec::Garch { p, .. } | VolatilitySpec::GjrGarch { p, .. } => p,
        }
    }

    pub fn o(&self) -> usize {
        match *self {
            VolatilitySpec::Garch { .. } => 0,
            VolatilitySpec::GjrGarch { o, .. } => o,
        }
    }

    pub fn q(&self) -> usize {
        match *self {
            VolatilitySpec::Garch { q, .. } | VolatilitySpec::GjrGarch { q, .. } => q,
        }
    }

    pub fn is_asymmetric(&self) -> bool {
        self.o() > 0
    }

    /// `ω` plus all lag coefficients.
    pub fn n_params(&self) -> usize {
        1 + self.p() + self.o() + self.q()
    }

    /// # Errors
    /// - [`GarchError::InvalidOrder`] when there are no shock terms, an
    ///   order exceeds [`MAX_VOL_ORDER`], or a GJR spec has `o = 0`.
    pub fn validate(&self) -> GarchResult<()> {
        let (p, o, q) = (self.p(), self.o(), self.q());
        if p + o == 0 {
            return Err(GarchError::InvalidOrder { p, o, q, reason: "need at least one ARCH or asymmetric lag" });
        }
        if p.max(o).max(q) > MAX_VOL_ORDER {
            return Err(GarchError::InvalidOrder { p, o, q, reason: "orders must be at most 5" });
        }
        if matches!(self, VolatilitySpec::GjrGarch { o: 0, .. }) {
            return Err(GarchError::InvalidOrder { p, o, q, reason: "GJR-GARCH needs o >= 1" });
        }
        Ok(())
    }
}

impl std::fmt::Display for VolatilitySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolatilitySpec::Garch { p, q } => write!(f, "GARCH({p},{q})"),
            VolatilitySpec::GjrGarch { p, o, q } => write!(f, "GJR-GARCH({p},{o},{q})"),
        }
    }
}

/// Conditional mean of the return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanSpec {
    Zero,
    #[default]
    Constant,
    /// `c + Σ φ_i y_{t−i}`; the first `k` observations are conditioned on.
    Ar(usize),
}

impl MeanSpec {
    pub fn n_params(&self) -> usize {
        match self {
            MeanSpec::Zero => 0,
            MeanSpec::Constant => 1,
            MeanSpec::Ar(k) => 1 + k,
        }
    }

    /// Observations consumed as lags before the likelihood starts.
    pub fn burn(&self) -> usize {
        match self {
            MeanSpec::Ar(k) => *k,
            _ => 0,
        }
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            MeanSpec::Zero => vec![],
            MeanSpec::Constant => vec!["mu".to_string()],
            MeanSpec::Ar(k) => std::iter::once("const".to_string())
                .chain((1..=*k).map(|i| format!("y[{i}]")))
                .collect(),
        }
    }

    pub fn validate(&self) -> GarchResult<()> {
        match self {
            MeanSpec::Ar(k) if *k == 0 || *k > MAX_AR_MEAN => Err(GarchError::InvalidMeanOrder { k: *k }),
            _ => Ok(()),
        }
    }
}

/// Standardized innovation distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    #[default]
    Normal,
    /// Student-t rescaled to unit variance; `ν > 2` is estimated.
    StudentT,
}

impl Distribution {
    pub fn n_params(&self) -> usize {
        match self {
            Distribution::Normal => 0,
            Distribution::StudentT => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Distribution::Normal => "Normal",
            Distribution::StudentT => "Student's t",
        }
    }
}

impl std::str::FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "gaussian" => Ok(Distribution::Normal),
            "t" | "studentt" | "student_t" | "studentst" => Ok(Distribution::StudentT),
            other => Err(format!("unknown distribution '{other}', expected 'normal' or 't'")),
        }
    }
}

/// Full model: mean, variance recursion and innovation law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarchSpec {
    pub mean: MeanSpec,
    pub vol: VolatilitySpec,
    pub dist: Distribution,
}

impl GarchSpec {
    /// Validated specification.
    ///
    /// # Errors
    /// - [`GarchError::InvalidOrder`] / [`GarchError::InvalidMeanOrder`].
    pub fn new(mean: MeanSpec, vol: VolatilitySpec, dist: Distribution) -> GarchResult<Self> {
        mean.validate()?;
        vol.validate()?;
        Ok(GarchSpec { mean, vol, dist })
    }

    pub fn n_mean(&self) -> usize {
        self.mean.n_params()
    }

    pub fn n_params(&self) -> usize {
        self.mean.n_params() + self.vol.n_params() + self.dist.n_params()
    }

    /// Index of `ω` in the parameter vector.
    pub fn omega_idx(&self) -> usize {
        self.n_mean()
    }

    /// Index of the first lag weight (`α₁`, or `γ₁` when `p = 0`).
    pub fn weights_idx(&self) -> usize {
        self.n_mean() + 1
    }

    /// Number of lag weights `p + o + q`.
    pub fn n_weights(&self) -> usize {
        self.vol.p() + self.vol.o() + self.vol.q()
    }

    /// Index of `ν` when the innovations are Student-t.
    pub fn nu_idx(&self) -> Option<usize> {
        match self.dist {
            Distribution::StudentT => Some(self.weights_idx() + self.n_weights()),
            Distribution::Normal => None,
        }
    }

    pub fn param_names(&self) -> Vec<String> {
        let mut names = self.mean.names();
        names.push("omega".to_string());
        names.extend((1..=self.vol.p()).map(|i| format!("alpha[{i}]")));
        names.extend((1..=self.vol.o()).map(|j| format!("gamma[{j}]")));
        names.extend((1..=self.vol.q()).map(|k| format!("beta[{k}]")));
        if self.dist == Distribution::StudentT {
            names.push("nu".to_string());
        }
        names
    }

    /// Short label such as `"GJR-GARCH(1,1,1)"`.
    pub fn label(&self) -> String {
        self.vol.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover order validation, the parameter layout and the
    // serialized form used in configuration files.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Layout of a GJR-GARCH(1,1,1) with AR(1) mean and t innovations.
    //
    // Given
    // -----
    // - MeanSpec::Ar(1), GjrGarch { 1, 1, 1 }, StudentT.
    //
    // Expect
    // ------
    // - 7 parameters in the documented order with ν last.
    fn gjr_layout_and_names() {
        let spec = GarchSpec::new(
            MeanSpec::Ar(1),
            VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 },
            Distribution::StudentT,
        )
        .unwrap();

        assert_eq!(spec.n_params(), 7);
        assert_eq!(spec.omega_idx(), 2);
        assert_eq!(spec.nu_idx(), Some(6));
        assert_eq!(
            spec.param_names(),
            vec!["const", "y[1]", "omega", "alpha[1]", "gamma[1]", "beta[1]", "nu"]
        );
        assert_eq!(spec.label(), "GJR-GARCH(1,1,1)");
    }

    #[test]
    // Purpose
    // -------
    // Invalid orders are rejected.
    //
    // Given
    // -----
    // - GARCH(0,1), GJR with o = 0, AR(0) mean, GARCH(6,1).
    //
    // Expect
    // ------
    // - `InvalidOrder` or `InvalidMeanOrder` for each.
    fn invalid_orders_are_rejected() {
        let n = Distribution::Normal;
        let c = MeanSpec::Constant;

        assert!(matches!(
            GarchSpec::new(c, VolatilitySpec::Garch { p: 0, q: 1 }, n),
            Err(GarchError::InvalidOrder { .. })
        ));
        assert!(matches!(
            GarchSpec::new(c, VolatilitySpec::GjrGarch { p: 1, o: 0, q: 1 }, n),
            Err(GarchError::InvalidOrder { .. })
        ));
        assert!(matches!(
            GarchSpec::new(MeanSpec::Ar(0), VolatilitySpec::Garch { p: 1, q: 1 }, n),
            Err(GarchError::InvalidMeanOrder { k: 0 })
        ));
        assert!(matches!(
            GarchSpec::new(c, VolatilitySpec::Garch { p: 6, q: 1 }, n),
            Err(GarchError::InvalidOrder { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Specs round-trip through the JSON form used by configuration files.
    //
    // Given
    // -----
    // - A tagged GJR spec and an AR(2) mean as JSON.
    //
    // Expect
    // ------
    // - The matching enum values; "t" parses as Student-t.
    fn specs_deserialize_from_config_json() {
        let vol: VolatilitySpec = serde_json::from_str(r#"{"model":"gjr_garch","p":1,"o":1,"q":1}"#).unwrap();
        let mean: MeanSpec = serde_json::from_str(r#"{"ar":2}"#).unwrap();

        assert_eq!(vol, VolatilitySpec::GjrGarch { p: 1, o: 1, q: 1 });
        assert_eq!(mean, MeanSpec::Ar(2));
        assert_eq!("t".parse::<Distribution>(), Ok(Distribution::StudentT));
    }
}
