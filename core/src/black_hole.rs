//! The black-hole record.
//!
//! Holes live in the cluster's arena and point at their progenitors by
//! `HoleId`. A hole without parents is primordial. Nothing but the
//! post-merger time evolution ever changes a hole after creation, and that
//! only touches `time` and `velocity`.

use crate::types::{norm, HoleId, SimTime, Vec3};
use serde::{Deserialize, Serialize};

/// A hole's tracked velocity.
///
/// Remnants carry the full kick vector. After time evolution only the
/// decayed speed is kept, so the record collapses to a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Velocity {
    Vector(Vec3),
    Speed(f64),
}

impl Velocity {
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::Vector(v) => norm(v),
            Self::Speed(s) => s.abs(),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::Speed(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackHole {
    pub id: HoleId,
    pub label: String,
    /// Solar masses.
    pub mass: f64,
    /// Dimensionless spin vector.
    pub spin: Vec3,
    /// |spin| at creation; the only spin quantity carried into a merger.
    pub spin_magnitude: f64,
    /// km/s.
    pub velocity: Velocity,
    /// Speed at formation, before any time evolution.
    pub initial_speed: f64,
    pub time: SimTime,
    pub formation_time: SimTime,
    pub parents: Option<(HoleId, HoleId)>,
    /// Larger over smaller progenitor mass; `None` for primordial holes.
    pub mass_ratio: Option<f64>,
}

/// Everything needed to create a hole; the cluster assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHole {
    pub label: String,
    pub mass: f64,
    pub spin: Vec3,
    pub velocity: Velocity,
    pub time: SimTime,
    pub parents: Option<(HoleId, HoleId)>,
    pub mass_ratio: Option<f64>,
}

impl NewHole {
    pub fn primordial(label: String, mass: f64, spin: Vec3) -> Self {
        Self {
            label,
            mass,
            spin,
            velocity: Velocity::default(),
            time: 0.0,
            parents: None,
            mass_ratio: None,
        }
    }
}

impl BlackHole {
    pub(crate) fn from_new(id: HoleId, new: NewHole) -> Self {
        let speed = new.velocity.magnitude();
        Self {
            id,
            label: new.label,
            mass: new.mass,
            spin_magnitude: norm(&new.spin),
            spin: new.spin,
            velocity: new.velocity,
            initial_speed: speed,
            time: new.time,
            formation_time: new.time,
            parents: new.parents,
            mass_ratio: new.mass_ratio,
        }
    }

    pub fn is_primordial(&self) -> bool {
        self.parents.is_none()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }
}
