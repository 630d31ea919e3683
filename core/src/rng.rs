//! Deterministic random number generation for the demo seeder.
//!
//! RULE: The seeder never calls a platform RNG. Every draw flows through a
//! `SeedRng` derived from the single master seed in `DemoOptions`.
//!
//! Each seeding stage gets its own stream, seeded from
//! (master_seed XOR stage_index), so adding a stage never shifts the draws
//! of the existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one seeding stage.
pub struct SeedRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SeedRng {
    /// Create a stage RNG from the master seed and a stable stage index.
    pub fn new(master_seed: u64, stage_index: u64) -> Self {
        let derived_seed = master_seed ^ (stage_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). Returns 0 when `n` is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Uniform index into a slice of length `len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }

    /// Roll an integer in [lo, hi].
    pub fn between(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Uniform float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample a triangular distribution on [lo, hi] peaking at `mode`.
    pub fn triangular(&mut self, lo: f64, hi: f64, mode: f64) -> f64 {
        let u = self.next_f64();
        let c = if hi > lo { (mode - lo) / (hi - lo) } else { 0.5 };
        if u < c {
            lo + ((hi - lo) * (mode - lo) * u).sqrt()
        } else {
            hi - ((hi - lo) * (hi - mode) * (1.0 - u)).sqrt()
        }
    }

    /// Pick an index with probability proportional to `weights`.
    /// Falls back to the last index when rounding leaves the roll unmatched.
    pub fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let roll = self.next_f64() * total;
        let mut acc = 0.0;
        for (i, w) in weights.iter().enumerate() {
            acc += w;
            if roll < acc {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }
}

/// Stable seeding-stage slots.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SeedStage {
    Customers = 0,
    Transmissions = 1,
    Vehicles = 2,
    Sales = 3,
}

impl SeedStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Transmissions => "transmissions",
            Self::Vehicles => "vehicles",
            Self::Sales => "sales",
        }
    }

    pub fn rng(self, master_seed: u64) -> SeedRng {
        SeedRng::new(master_seed, self as u64).with_name(self.name())
    }
}
