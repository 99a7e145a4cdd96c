//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through the single SimRng owned by the run,
//! seeded from the run's seed. It is never re-seeded mid-run.
//!
//! Draw order is part of the result: population seeding first, then per
//! merger the heavier hole's spin direction, the lighter hole's spin
//! direction, and for high mass ratio mergers one sign per hole.
//! Reordering any of these changes every later draw.

use crate::types::Vec3;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::f64::consts::PI;

/// The run's random source and isotropic sampler.
pub struct SimRng {
    seed: u64,
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Direction on the unit sphere: phi = U(0, 2pi), theta = asin(U(0, 1)).
    ///
    /// Consumes exactly two draws, phi first. The theta mapping only reaches
    /// the upper hemisphere; callers depend on that exact distribution.
    pub fn unit_vector(&mut self) -> Vec3 {
        let phi = self.next_f64() * 2.0 * PI;
        let theta = self.next_f64().asin();
        [phi.cos() * theta.sin(), phi.sin() * theta.sin(), theta.cos()]
    }

    /// +1.0 or -1.0 with equal probability. One draw.
    pub fn sign(&mut self) -> f64 {
        if self.inner.next_u64() >> 63 == 0 {
            1.0
        } else {
            -1.0
        }
    }
}
