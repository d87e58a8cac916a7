//! Synthetic platform for dry runs, tests and benches.
//!
//! Stable iff `product(selected counts) * workload <= budget`. An optional
//! seeded flake rate turns some stable answers unstable, to exercise the
//! search against a noisy system without deploying anything.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::platform::Platform;
use crate::sizing::Deployment;

#[derive(Clone, Debug)]
pub struct SimulatedPlatform {
    budget: u64,
    factors: Option<Vec<String>>,
    flake_rate: f64,
    rng: StdRng,
    probes: u64,
}

impl SimulatedPlatform {
    /// Every dimension count takes part in the product.
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            factors: None,
            flake_rate: 0.0,
            rng: StdRng::seed_from_u64(0),
            probes: 0,
        }
    }

    /// Only the named dimensions take part in the product.
    pub fn with_factors<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.factors = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Report a stable answer as unstable with probability `rate`.
    pub fn with_flakiness(mut self, rate: f64, seed: u64) -> Self {
        self.flake_rate = rate.clamp(0.0, 1.0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn probes(&self) -> u64 {
        self.probes
    }

    /// Load implied by `deployment`, saturating on overflow.
    pub fn load(&self, deployment: &Deployment) -> u64 {
        let size = deployment
            .counts()
            .iter()
            .filter(|(name, _)| {
                self.factors
                    .as_ref()
                    .map_or(true, |f| f.iter().any(|n| n == name))
            })
            .fold(1u64, |acc, &(_, v)| acc.saturating_mul(v.max(0) as u64));
        size.saturating_mul(deployment.workload())
    }
}

impl Platform for SimulatedPlatform {
    fn probe(&mut self, deployment: &Deployment) -> bool {
        self.probes += 1;
        let ok = self.load(deployment) <= self.budget;
        if ok && self.flake_rate > 0.0 && self.rng.gen_bool(self.flake_rate) {
            return false;
        }
        ok
    }
}
