//! Common surface of test outcomes.
//!
//! Every diagnostic returns a value object implementing [`TestOutcome`], so
//! the pipeline can interpret any of them at a significance level without
//! knowing which test produced it.

pub trait TestOutcome {
    /// Test statistic.
    fn statistic(&self) -> f64;

    /// Asymptotic p-value in `[0, 1]`.
    fn p_value(&self) -> f64;

    /// `true` when the null hypothesis is rejected at level `alpha`
    /// (`p < alpha`).
    fn rejects_null(&self, alpha: f64) -> bool {
        self.p_value() < alpha
    }
}
