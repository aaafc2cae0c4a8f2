//! Pluggable randomness for template choice and reply latency.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform value in the half-open `range`.
    fn between(&mut self, range: Range<u64>) -> u64;
}

/// Thread-local RNG, used by the app.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn between(&mut self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        rand::thread_rng().gen_range(range)
    }
}

/// Reproducible RNG from a fixed seed.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    fn between(&mut self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        self.0.gen_range(range)
    }
}
