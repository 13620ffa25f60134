//! Deterministic random number generation.
//!
//! Wraps PCG-64 so a run can be replayed from its seed. Unseeded runs draw
//! the seed from OS entropy once and then behave exactly like a seeded run,
//! which lets the seed be logged and reused.

use rand::prelude::*;
use rand_pcg::Pcg64;

/// Seedable, non-cryptographic random source for the sampler.
#[derive(Debug, Clone)]
pub struct PiRng {
    /// Seed the generator was created from.
    master_seed: u64,
    /// Internal PCG state.
    rng: Pcg64,
}

impl PiRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            rng: Pcg64::seed_from_u64(master_seed),
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Create from an optional seed, falling back to entropy.
    #[must_use]
    pub fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    /// Get the seed this generator started from.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate a random f64 in `[min, max)`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn gen_range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "Invalid range: min > max");
        min + (max - min) * self.gen_f64()
    }

    /// Generate a random u64 in the inclusive range `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn gen_range_u64(&mut self, min: u64, max: u64) -> u64 {
        self.rng.gen_range(min..=max)
    }
}
