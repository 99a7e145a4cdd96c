//! Inverse-transform sampling of initial black-hole masses.
//!
//! A progenitor mass is drawn from the power law p(m) ∝ m^-(alpha-1) on
//! [min_bh_star, max_star] by pushing a uniform draw through the closed-form
//! quantile function. The progenitor is then converted to a black-hole mass
//! either by a fixed retained fraction or by the tabulated
//! progenitor -> remnant curve.
//!
//! The sampler is built once per configuration, before any hole is drawn,
//! so every configuration fault surfaces ahead of the run.

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    imf::power_law_integral,
    rng::SimRng,
};

/// Progenitor -> black-hole mass control points (solar masses), after
/// Spera & Mapelli (2017). Must stay sorted by progenitor mass.
pub const SPERA_MAPELLI_KNOTS: [(f64, f64); 17] = [
    (8.0, 1.3),
    (13.8, 1.4),
    (19.5, 4.0),
    (25.2, 10.7),
    (31.0, 21.3),
    (36.8, 33.0),
    (42.5, 38.1),
    (48.2, 43.2),
    (54.0, 48.3),
    (59.8, 53.4),
    (65.5, 48.5),
    (71.2, 28.8),
    (77.0, 31.1),
    (82.8, 33.8),
    (88.5, 36.6),
    (94.2, 39.2),
    (100.0, 41.9),
];

/// Smallest progenitor mass used when the lookup curve is active.
pub const LOOKUP_MIN_BH_STAR: f64 = 16.2115;

/// Closed-form quantile of p(m) ∝ m^-(alpha-1) on [min, max].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawQuantile {
    /// Exponent of the CDF, 2 - alpha. Zero means the log-uniform case.
    k: f64,
    min: f64,
    max: f64,
}

impl PowerLawQuantile {
    pub fn new(alpha: f64, min: f64, max: f64) -> SimResult<Self> {
        let invalid = SimError::QuantileInversion { alpha, min, max };
        if !(alpha.is_finite() && min.is_finite() && max.is_finite()) || min <= 0.0 || min >= max {
            return Err(invalid);
        }
        let norm = power_law_integral(alpha - 1.0, min, max);
        if !norm.is_finite() || norm <= 0.0 {
            return Err(invalid);
        }

        let quantile = Self { k: 2.0 - alpha, min, max };

        // The branch is only usable if it maps [0, 1] back onto [min, max].
        let lo = quantile.eval(0.0);
        let hi = quantile.eval(1.0);
        let tol = 1e-9 * max;
        if !lo.is_finite() || !hi.is_finite() || (lo - min).abs() > tol || (hi - max).abs() > tol {
            return Err(invalid);
        }
        Ok(quantile)
    }

    /// Mass at cumulative probability `p`.
    pub fn eval(&self, p: f64) -> f64 {
        if self.k.abs() < 1e-12 {
            self.min * (self.max / self.min).powf(p)
        } else {
            let lo = self.min.powf(self.k);
            let hi = self.max.powf(self.k);
            (lo + p * (hi - lo)).powf(1.0 / self.k)
        }
    }

    /// Cumulative probability at mass `m`, clamped to [0, 1].
    pub fn cdf(&self, m: f64) -> f64 {
        let m = m.clamp(self.min, self.max);
        if self.k.abs() < 1e-12 {
            (m / self.min).ln() / (self.max / self.min).ln()
        } else {
            let lo = self.min.powf(self.k);
            (m.powf(self.k) - lo) / (self.max.powf(self.k) - lo)
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Piecewise-linear curve through (progenitor, remnant) knots.
/// Undefined outside the knot range.
#[derive(Debug, Clone, PartialEq)]
pub struct MassLookup {
    knots: Vec<(f64, f64)>,
}

impl MassLookup {
    pub fn new(knots: Vec<(f64, f64)>) -> SimResult<Self> {
        if knots.len() < 2 {
            return Err(SimError::InvalidConfig {
                key: "mass_lookup",
                reason: "need at least two knots".into(),
            });
        }
        if knots.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(SimError::InvalidConfig {
                key: "mass_lookup",
                reason: "knots must be strictly increasing in progenitor mass".into(),
            });
        }
        Ok(Self { knots })
    }

    pub fn spera_mapelli() -> Self {
        Self { knots: SPERA_MAPELLI_KNOTS.to_vec() }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.knots[0].0, self.knots[self.knots.len() - 1].0)
    }

    pub fn covers(&self, lo: f64, hi: f64) -> bool {
        let (min, max) = self.range();
        lo >= min && hi <= max
    }

    pub fn interpolate(&self, mass: f64) -> SimResult<f64> {
        let (min, max) = self.range();
        if !(min..=max).contains(&mass) {
            return Err(SimError::LookupOutOfRange { mass, min, max });
        }
        // First knot strictly above `mass`; the segment ends there.
        let upper = self
            .knots
            .partition_point(|&(x, _)| x <= mass)
            .min(self.knots.len() - 1);
        let (x0, y0) = self.knots[upper - 1];
        let (x1, y1) = self.knots[upper];
        Ok(y0 + (y1 - y0) * (mass - x0) / (x1 - x0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MassTransform {
    /// Black hole keeps this fraction of the progenitor mass.
    Fraction(f64),
    Lookup(MassLookup),
}

/// Uniform draw -> initial black-hole mass.
#[derive(Debug, Clone, PartialEq)]
pub struct MassSampler {
    quantile: PowerLawQuantile,
    transform: MassTransform,
}

impl MassSampler {
    pub fn new(quantile: PowerLawQuantile, transform: MassTransform) -> SimResult<Self> {
        if let MassTransform::Lookup(lookup) = &transform {
            let (lo, hi) = quantile.bounds();
            if !lookup.covers(lo, hi) {
                let (min, max) = lookup.range();
                return Err(SimError::InvalidConfig {
                    key: "use_mass_lookup",
                    reason: format!(
                        "progenitor range [{lo}, {hi}] exceeds lookup range [{min}, {max}]"
                    ),
                });
            }
        }
        Ok(Self { quantile, transform })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        log::info!(
            "Building mass quantile: alpha={} on [{}, {}]",
            config.imf_alpha,
            config.min_bh_star,
            config.max_star
        );
        let quantile =
            PowerLawQuantile::new(config.imf_alpha, config.min_bh_star, config.max_star)?;
        let transform = if config.use_mass_lookup {
            MassTransform::Lookup(MassLookup::spera_mapelli())
        } else {
            MassTransform::Fraction(config.bh_mass_frac)
        };
        Self::new(quantile, transform)
    }

    /// Black-hole mass for a uniform draw `u` in [0, 1).
    pub fn mass_for(&self, u: f64) -> SimResult<f64> {
        let progenitor = self.quantile.eval(u);
        match &self.transform {
            MassTransform::Fraction(frac) => Ok(frac * progenitor),
            MassTransform::Lookup(lookup) => lookup.interpolate(progenitor),
        }
    }

    /// Consumes exactly one draw.
    pub fn draw(&self, rng: &mut SimRng) -> SimResult<f64> {
        self.mass_for(rng.next_f64())
    }

    pub fn quantile(&self) -> &PowerLawQuantile {
        &self.quantile
    }
}
