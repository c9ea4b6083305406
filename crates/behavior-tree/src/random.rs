//! Uniform sampling for random selection nodes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`.
pub trait Sampler {
    fn sample(&mut self) -> f32;
}

/// [`Sampler`] backed by a standard RNG.
#[derive(Debug, Clone)]
pub struct RandSampler {
    rng: StdRng,
}

impl RandSampler {
    /// Seeds from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sampler for replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Sampler for RandSampler {
    fn sample(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    samples: Vec<f32>,
    cursor: usize,
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedSampler {
    /// # Panics
    ///
    /// Panics if `samples` is empty.
    pub fn new(samples: Vec<f32>) -> Self {
        assert!(!samples.is_empty(), "ScriptedSampler needs at least one sample");
        Self { samples, cursor: 0 }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Sampler for ScriptedSampler {
    fn sample(&mut self) -> f32 {
        let value = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        value
    }
}
