//! Card stat ("PV") generation
//!
//! Privileged handles always get a fixed value. Everyone else draws uniformly
//! from `min..=max` in `step` increments through an injected [`StatSource`].

use crate::options::StatPolicy;
use crate::types::normalize_handle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform choices for stat draws.
pub trait StatSource {
    /// Return an index in `0..options`. `options` is always > 0.
    fn pick(&mut self, options: usize) -> usize;
}

/// [`StatSource`] backed by a `rand` generator.
pub struct RandomStats<R: Rng> {
    rng: R,
}

impl RandomStats<StdRng> {
    /// Non-deterministic source for production runs.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomStats<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> StatSource for RandomStats<R> {
    fn pick(&mut self, options: usize) -> usize {
        self.rng.gen_range(0..options)
    }
}

impl StatPolicy {
    /// Number of distinct values a regular handle can draw.
    pub fn option_count(&self) -> usize {
        ((self.max - self.min) / self.step) as usize + 1
    }

    pub fn is_privileged(&self, handle: &str) -> bool {
        let handle = normalize_handle(handle);
        self.privileged_handles
            .iter()
            .any(|h| normalize_handle(h) == handle)
    }
}

/// Stat printed on the card for `handle`.
pub fn compute_stat(handle: &str, policy: &StatPolicy, source: &mut impl StatSource) -> u32 {
    if policy.is_privileged(handle) {
        return policy.privileged_value;
    }

    let index = source.pick(policy.option_count()) as u32;
    policy.min + index * policy.step
}
