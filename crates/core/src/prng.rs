//! Deterministic pseudo-random generators.
//!
//! Two generators live here:
//!
//! - [`ParkMiller`]: the multiplicative LCG (`s = s * 16807 mod 2^31 - 1`)
//!   used only to shuffle the noise permutation table. Its exact sequence is
//!   part of the noise contract.
//! - [`Xorshift64`]: general-purpose generator for particle jitter and
//!   decorative spawns. Same seed, same scene.

use serde::{Deserialize, Serialize};

/// Modulus of the Park-Miller generator (`2^31 - 1`).
pub const PARK_MILLER_MODULUS: u64 = 2_147_483_647;

/// Multiplier of the Park-Miller generator.
pub const PARK_MILLER_MULTIPLIER: u64 = 16_807;

/// Multiplicative linear congruential generator with no additive constant.
///
/// A state of 0 stays 0 forever. That is reproduced deliberately: the
/// permutation table for seed 0 is a fixed rotation and must stay that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParkMiller {
    state: u64,
}

impl ParkMiller {
    /// Creates a generator from any signed 32-bit seed.
    ///
    /// The seed is reduced into `[0, 2^31 - 1)` with a Euclidean remainder, so
    /// negative seeds map to positive states instead of producing negative
    /// swap indices.
    pub fn new(seed: i32) -> Self {
        Self {
            state: i64::from(seed).rem_euclid(PARK_MILLER_MODULUS as i64) as u64,
        }
    }

    /// Advances the state and returns it.
    pub fn next_state(&mut self) -> u64 {
        // state < 2^31 and multiplier < 2^15, so the product fits easily in u64.
        self.state = (self.state * PARK_MILLER_MULTIPLIER) % PARK_MILLER_MODULUS;
        self.state
    }

    /// Current state without advancing.
    pub fn state(&self) -> u64 {
        self.state
    }
}

/// Xorshift64 deterministic PRNG with shifts (13, 7, 17).
///
/// Seed 0 is a fixed point of xorshift, so it is replaced by a non-zero
/// fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [-0.5, 0.5), the centered jitter used for spawn offsets.
    pub fn next_centered(&mut self) -> f64 {
        self.next_f64() - 0.5
    }

    /// `+1.0` or `-1.0` with equal probability.
    pub fn next_sign(&mut self) -> f64 {
        if self.next_f64() < 0.5 {
            1.0
        } else {
            -1.0
        }
    }

    /// Returns `true` with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }
}
