use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The single source of randomness threaded through every transition.
///
/// Theft, births, deaths, military tier picks and event draws all read from
/// here, so a seeded source reproduces a game exactly.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Bernoulli trial with success probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.unit() * len as f64) as usize).min(len - 1)
    }

    /// 64 random bits.
    fn next_u64(&mut self) -> u64 {
        (self.unit() * u64::MAX as f64) as u64
    }

    /// Uniform integer in `[low, high)`. Returns `low` for an empty range.
    fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + self.index((high - low) as usize) as u32
    }
}

/// Seeded ChaCha8 generator.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SimRng {
    /// A seed of 0 picks a random seed; [`SimRng::seed`] reports the one used.
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 {
            rand::thread_rng().r#gen()
        } else {
            seed
        };
        SimRng {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SimRng {
    fn unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

/// Replays a fixed cycle of unit values. Useful for pinning down a branch.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    position: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        FixedSequence {
            values,
            position: 0,
        }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        FixedSequence::new(vec![value])
    }
}

impl RandomSource for FixedSequence {
    fn unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.position % self.values.len()];
        self.position += 1;
        v.clamp(0.0, 0.999_999)
    }
}
