//! The globular cluster: live and ejected populations plus the escape gate.
//!
//! RULE: every hole enters through `insert`, which decides once and for all
//! whether it stays bound. A hole never moves between the live and ejected
//! lists after that.

use crate::{
    black_hole::{BlackHole, NewHole},
    config::SimConfig,
    error::{SimError, SimResult},
    imf,
    types::HoleId,
};
use serde::{Deserialize, Serialize};

/// Newton's constant, m^3 kg^-1 s^-2.
pub const G: f64 = 6.6743e-11;
/// Solar mass, kg.
pub const SOLAR_MASS_KG: f64 = 2e30;
/// One parsec, m.
pub const PARSEC_M: f64 = 3.086e16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobularCluster {
    /// Solar masses.
    mass: f64,
    radius_m: f64,
    /// km/s, fixed at construction.
    escape_velocity: f64,
    target_count: usize,
    /// Arena of every hole ever created, indexed by HoleId.
    holes: Vec<BlackHole>,
    live: Vec<HoleId>,
    ejected: Vec<HoleId>,
}

impl GlobularCluster {
    pub fn new(
        mass: f64,
        radius_pc: f64,
        imf_alpha: f64,
        min_bh_star: f64,
        min_star: f64,
        max_star: f64,
    ) -> Self {
        let radius_m = radius_pc * PARSEC_M;
        let escape_velocity = (2.0 * G * mass * SOLAR_MASS_KG / radius_m).sqrt() * 1e-3;
        let target_count =
            imf::black_hole_count(mass, imf_alpha, min_star, max_star, min_bh_star);
        Self {
            mass,
            radius_m,
            escape_velocity,
            target_count,
            holes: Vec::new(),
            live: Vec::new(),
            ejected: Vec::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.cluster_mass,
            config.radius,
            config.imf_alpha,
            config.min_bh_star,
            config.min_star,
            config.max_star,
        )
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn escape_velocity(&self) -> f64 {
        self.escape_velocity
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Create a hole and file it as live or ejected.
    /// Returns the new id and whether it was ejected.
    pub fn insert(&mut self, new: NewHole) -> (HoleId, bool) {
        let id = self.holes.len();
        let hole = BlackHole::from_new(id, new);
        let ejected = hole.speed() >= self.escape_velocity;
        self.holes.push(hole);
        if ejected {
            self.ejected.push(id);
        } else {
            self.live.push(id);
        }
        (id, ejected)
    }

    /// Remove and return the live hole at `index`.
    pub fn remove_at(&mut self, index: usize) -> SimResult<HoleId> {
        if index >= self.live.len() {
            return Err(SimError::PopulationIndex {
                index,
                len: self.live.len(),
            });
        }
        Ok(self.live.remove(index))
    }

    pub fn hole(&self, id: HoleId) -> SimResult<&BlackHole> {
        self.holes.get(id).ok_or(SimError::UnknownHole { id })
    }

    pub(crate) fn hole_mut(&mut self, id: HoleId) -> SimResult<&mut BlackHole> {
        self.holes.get_mut(id).ok_or(SimError::UnknownHole { id })
    }

    /// Live hole at position `index` of the current ordering.
    pub fn live_at(&self, index: usize) -> Option<&BlackHole> {
        self.live.get(index).map(|&id| &self.holes[id])
    }

    pub fn live(&self) -> &[HoleId] {
        &self.live
    }

    pub fn ejected(&self) -> &[HoleId] {
        &self.ejected
    }

    pub fn holes(&self) -> &[BlackHole] {
        &self.holes
    }

    pub fn live_holes(&self) -> impl Iterator<Item = &BlackHole> + '_ {
        self.live.iter().map(|&id| &self.holes[id])
    }

    pub fn ejected_holes(&self) -> impl Iterator<Item = &BlackHole> + '_ {
        self.ejected.iter().map(|&id| &self.holes[id])
    }

    pub fn is_live(&self, id: HoleId) -> bool {
        self.live.contains(&id)
    }

    /// Ascending time. Stable, so equal times keep their current order.
    pub fn sort_live_by_time(&mut self) {
        let holes = &self.holes;
        self.live
            .sort_by(|&a, &b| holes[a].time.total_cmp(&holes[b].time));
    }

    /// Descending mass. Stable.
    pub fn sort_live_by_mass(&mut self) {
        let holes = &self.holes;
        self.live
            .sort_by(|&a, &b| holes[b].mass.total_cmp(&holes[a].mass));
    }
}
