//! Run configuration.
//!
//! `ClusterParams` is the partial form read from JSON: any key may be
//! omitted. `SimConfig::from_params` fills the gaps with defaults and logs
//! each one, then validates. The resolved config is fixed for the run.

use crate::{
    error::{SimError, SimResult},
    mass_sampler::LOOKUP_MIN_BH_STAR,
};
use serde::{Deserialize, Serialize};

/// How primordial spin magnitudes are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinDistribution {
    /// Magnitude U(0, 0.9).
    #[default]
    Uniform,
    /// Magnitude 0. Directions are still drawn so the stream is unchanged.
    Zero,
}

/// Upper bound on primordial spin magnitude; the remnant fits degrade beyond it.
pub const MAX_PRIMORDIAL_SPIN: f64 = 0.9;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterParams {
    pub cluster_mass: Option<f64>,
    pub radius: Option<f64>,
    pub imf_alpha: Option<f64>,
    pub min_bh_star: Option<f64>,
    pub bh_mass_frac: Option<f64>,
    pub use_mass_lookup: Option<bool>,
    pub min_star: Option<f64>,
    pub max_star: Option<f64>,
    pub vel_thresh: Option<f64>,
    pub rand_spin_type: Option<SpinDistribution>,
    pub progress_interval: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Total cluster mass, solar masses.
    pub cluster_mass: f64,
    /// Radius where mergers happen, parsecs.
    pub radius: f64,
    /// IMF exponent: dn/dm = m^-alpha.
    pub imf_alpha: f64,
    /// Lightest star that leaves a black hole, solar masses.
    pub min_bh_star: f64,
    /// Fraction of the progenitor mass kept by the hole.
    pub bh_mass_frac: f64,
    /// Use the progenitor -> remnant lookup curve instead of `bh_mass_frac`.
    pub use_mass_lookup: bool,
    pub min_star: f64,
    pub max_star: f64,
    /// Speed a retained remnant decays to before merging again, km/s.
    pub vel_thresh: f64,
    pub rand_spin_type: SpinDistribution,
    /// Log progress every this many mergers.
    pub progress_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cluster_mass: 1e6,
            radius: 2.0,
            imf_alpha: 2.35,
            min_bh_star: 10.0,
            bh_mass_frac: 0.5,
            use_mass_lookup: false,
            min_star: 0.8,
            max_star: 100.0,
            vel_thresh: 0.1,
            rand_spin_type: SpinDistribution::Uniform,
            progress_interval: 1000,
        }
    }
}

macro_rules! resolve {
    ($params:ident, $defaults:ident, $key:ident) => {
        match $params.$key {
            Some(v) => v,
            None => {
                log::info!(
                    "'{}' not set, defaulting to {:?}",
                    stringify!($key),
                    $defaults.$key
                );
                $defaults.$key
            }
        }
    };
}

impl SimConfig {
    /// Apply defaults for omitted keys, the lookup override, then validate.
    pub fn from_params(params: &ClusterParams) -> SimResult<Self> {
        let d = SimConfig::default();
        let mut config = SimConfig {
            cluster_mass: resolve!(params, d, cluster_mass),
            radius: resolve!(params, d, radius),
            imf_alpha: resolve!(params, d, imf_alpha),
            min_bh_star: resolve!(params, d, min_bh_star),
            bh_mass_frac: resolve!(params, d, bh_mass_frac),
            use_mass_lookup: resolve!(params, d, use_mass_lookup),
            min_star: resolve!(params, d, min_star),
            max_star: resolve!(params, d, max_star),
            vel_thresh: resolve!(params, d, vel_thresh),
            rand_spin_type: resolve!(params, d, rand_spin_type),
            progress_interval: params.progress_interval.unwrap_or(d.progress_interval),
        };

        config.apply_lookup_override();
        config.validate()?;
        Ok(config)
    }

    /// The lookup curve only maps progenitors from 16.2115 Msun upwards, so
    /// enabling it pins `min_bh_star` there whatever the caller set.
    pub fn apply_lookup_override(&mut self) {
        if self.use_mass_lookup && self.min_bh_star != LOOKUP_MIN_BH_STAR {
            log::info!(
                "Using mass lookup table. Setting the minimum BH star to {LOOKUP_MIN_BH_STAR}"
            );
            self.min_bh_star = LOOKUP_MIN_BH_STAR;
        }
    }

    /// Read a JSON parameter file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let params: ClusterParams = serde_json::from_str(&content)?;
        Ok(Self::from_params(&params)?)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> SimResult<()> {
        positive("cluster_mass", self.cluster_mass)?;
        positive("radius", self.radius)?;
        positive("min_star", self.min_star)?;
        positive("max_star", self.max_star)?;
        positive("min_bh_star", self.min_bh_star)?;

        if !self.imf_alpha.is_finite() {
            return Err(invalid("imf_alpha", "must be finite"));
        }
        if self.min_star >= self.max_star {
            return Err(invalid("min_star", "must be below max_star"));
        }
        if self.min_bh_star >= self.max_star {
            return Err(invalid("min_bh_star", "must be below max_star"));
        }
        if self.min_bh_star < self.min_star {
            return Err(invalid("min_bh_star", "must not be below min_star"));
        }
        if self.use_mass_lookup && self.min_bh_star != LOOKUP_MIN_BH_STAR {
            return Err(invalid("min_bh_star", "must be 16.2115 when use_mass_lookup is set"));
        }
        if !(self.bh_mass_frac > 0.0 && self.bh_mass_frac <= 1.0) {
            return Err(invalid("bh_mass_frac", "must be in (0, 1]"));
        }
        if !self.vel_thresh.is_finite() || self.vel_thresh < 0.0 {
            return Err(invalid("vel_thresh", "must be a non-negative number"));
        }
        if self.progress_interval == 0 {
            return Err(invalid("progress_interval", "must be at least 1"));
        }
        Ok(())
    }

    /// Shortcut for tests: defaults with a small cluster and zero spins.
    pub fn default_test() -> Self {
        Self {
            cluster_mass: 1e4,
            rand_spin_type: SpinDistribution::Zero,
            ..Self::default()
        }
    }
}

fn positive(key: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(key, "must be a positive number"))
    }
}

fn invalid(key: &'static str, reason: &str) -> SimError {
    SimError::InvalidConfig {
        key,
        reason: reason.to_string(),
    }
}
