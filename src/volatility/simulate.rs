//! Simulation of return paths from a GARCH-family model.
//!
//! The recursion starts at the unconditional variance (and, for AR means,
//! the unconditional mean); the first `burn` draws are discarded.
use crate::volatility::{
    errors::{GarchError, GarchResult},
    params::GarchParams,
    spec::{Distribution, GarchSpec, MeanSpec},
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution as _, Normal, StudentT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    pub seed: u64,
    /// Draws discarded before the returned path.
    pub burn: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions { seed: 42, burn: 500 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedPath {
    pub returns: Vec<f64>,
    pub variance: Vec<f64>,
    /// Standardized innovations `z_t`.
    pub innovations: Vec<f64>,
}

enum Innovation {
    Normal(Normal<f64>),
    StudentT { dist: StudentT<f64>, scale: f64 },
}

impl Innovation {
    fn new(dist: Distribution, nu: Option<f64>) -> GarchResult<Self> {
        match (dist, nu) {
            (Distribution::StudentT, Some(nu)) => Ok(Innovation::StudentT {
                dist: StudentT::new(nu).map_err(|e| GarchError::Distribution(e.to_string()))?,
                scale: ((nu - 2.0) / nu).sqrt(),
            }),
            _ => Ok(Innovation::Normal(
                Normal::new(0.0, 1.0).map_err(|e| GarchError::Distribution(e.to_string()))?,
            )),
        }
    }

    fn draw(&self, rng: &mut StdRng) -> f64 {
        match self {
            Innovation::Normal(d) => d.sample(rng),
            Innovation::StudentT { dist, scale } => dist.sample(rng) * scale,
        }
    }
}

/// Simulate `n` observations from `spec` at `params`.
///
/// # Errors
/// - [`GarchError::InsufficientData`] when `n == 0`.
/// - Parameter errors when `params` does not satisfy `spec`.
pub fn simulate(
    spec: &GarchSpec, params: &GarchParams, n: usize, opts: &SimOptions,
) -> GarchResult<SimulatedPath> {
    if n == 0 {
        return Err(GarchError::InsufficientData { needed: 1, found: 0 });
    }
    let p = GarchParams::new(
        spec,
        params.mean.clone(),
        params.omega,
        params.alpha.clone(),
        params.gamma.clone(),
        params.beta.clone(),
        params.nu,
    )?;
    let innovation = Innovation::new(spec.dist, p.nu)?;
    let mut rng = StdRng::seed_from_u64(opts.seed);

    let uncond_var = p.unconditional_variance();
    let uncond_mean = match spec.mean {
        MeanSpec::Zero => 0.0,
        MeanSpec::Constant => p.mean[0],
        MeanSpec::Ar(k) => p.mean[0] / (1.0 - (1..=k).map(|i| p.mean[i]).sum::<f64>()),
    };

    let total = n + opts.burn;
    let mut y: Vec<f64> = Vec::with_capacity(total);
    let mut eps: Vec<f64> = Vec::with_capacity(total);
    let mut sigma2: Vec<f64> = Vec::with_capacity(total);
    let mut z: Vec<f64> = Vec::with_capacity(total);
    for t in 0..total {
        let mut s2 = p.omega;
        for (i, a) in p.alpha.iter().enumerate() {
            s2 += a * t.checked_sub(i + 1).map_or(uncond_var, |s| eps[s] * eps[s]);
        }
        for (j, g) in p.gamma.iter().enumerate() {
            s2 += g * t
                .checked_sub(j + 1)
                .map_or(0.5 * uncond_var, |s| if eps[s] < 0.0 { eps[s] * eps[s] } else { 0.0 });
        }
        for (k, b) in p.beta.iter().enumerate() {
            s2 += b * t.checked_sub(k + 1).map_or(uncond_var, |s| sigma2[s]);
        }

        let zt = innovation.draw(&mut rng);
        let e = s2.sqrt() * zt;
        let m = match spec.mean {
            MeanSpec::Zero => 0.0,
            MeanSpec::Constant => p.mean[0],
            MeanSpec::Ar(k) => {
                p.mean[0]
                    + (1..=k)
                        .map(|i| p.mean[i] * t.checked_sub(i).map_or(uncond_mean, |s| y[s]))
                        .sum::<f64>()
            }
        };
        y.push(m + e);
        eps.push(e);
        sigma2.push(s2);
        z.push(zt);
    }

    Ok(SimulatedPath {
        returns: y.split_off(opts.burn),
        variance: sigma2.split_off(opts.burn),
        innovations: z.split_off(opts.burn),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::spec::VolatilitySpec;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover determinism under a seed, the path length after burn
    // and the sample moments of a long simulated path.
    // -------------------------------------------------------------------------

    fn garch_spec(dist: Distribution) -> GarchSpec {
        GarchSpec::new(MeanSpec::Constant, VolatilitySpec::Garch { p: 1, q: 1 }, dist).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Same seed, same path; burn-in is dropped.
    //
    // Given
    // -----
    // - Two simulations with seed 3 and one with seed 4, n = 200.
    //
    // Expect
    // ------
    // - Identical first two paths, different third; 200 returns.
    fn seeded_paths_are_reproducible() {
        let spec = garch_spec(Distribution::Normal);
        let params =
            GarchParams::new(&spec, array![0.0], 0.1, array![0.1], Array1::zeros(0), array![0.8], None).unwrap();

        let a = simulate(&spec, &params, 200, &SimOptions { seed: 3, burn: 50 }).unwrap();
        let b = simulate(&spec, &params, 200, &SimOptions { seed: 3, burn: 50 }).unwrap();
        let c = simulate(&spec, &params, 200, &SimOptions { seed: 4, burn: 50 }).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.returns, c.returns);
        assert_eq!(a.returns.len(), 200);
        assert_eq!(a.variance.len(), 200);
    }

    #[test]
    // Purpose
    // -------
    // Long-run sample variance matches ω / (1 − persistence).
    //
    // Given
    // -----
    // - Student-t (ν = 8) GARCH(1,1) with ω = 0.2, α = 0.1, β = 0.7 and
    //   n = 50 000.
    //
    // Expect
    // ------
    // - Sample variance within 10% of 1.0; sample mean near μ = 0.1.
    fn long_run_moments_match() {
        let spec = garch_spec(Distribution::StudentT);
        let params =
            GarchParams::new(&spec, array![0.1], 0.2, array![0.1], Array1::zeros(0), array![0.7], Some(8.0))
                .unwrap();

        let path = simulate(&spec, &params, 50_000, &SimOptions::default()).unwrap();
        let n = path.returns.len() as f64;
        let mean = path.returns.iter().sum::<f64>() / n;
        let var = path.returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        assert!((mean - 0.1).abs() < 0.03, "mean = {mean}");
        assert!((var - 1.0).abs() < 0.1, "var = {var}");
    }

    #[test]
    // Purpose
    // -------
    // A zero-length request is rejected.
    //
    // Given
    // -----
    // - n = 0.
    //
    // Expect
    // ------
    // - `InsufficientData`.
    fn zero_length_is_rejected() {
        let spec = garch_spec(Distribution::Normal);
        let params =
            GarchParams::new(&spec, array![0.0], 0.1, array![0.1], Array1::zeros(0), array![0.8], None).unwrap();

        assert!(matches!(
            simulate(&spec, &params, 0, &SimOptions::default()),
            Err(GarchError::InsufficientData { .. })
        ));
    }
}
