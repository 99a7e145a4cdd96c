//! Shared primitive types used across the entire simulation.

/// Simulation time in seconds since the cluster formed.
pub type SimTime = f64;

/// Position of a hole in the cluster's arena. Stable for the run's lifetime.
pub type HoleId = usize;

/// The canonical run identifier.
pub type RunId = String;

/// A Cartesian 3-vector (spins are dimensionless, velocities in km/s).
pub type Vec3 = [f64; 3];

pub const ZERO_VEC3: Vec3 = [0.0, 0.0, 0.0];

/// Euclidean magnitude of a 3-vector.
pub fn norm(v: &Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn scale(v: &Vec3, k: f64) -> Vec3 {
    [v[0] * k, v[1] * k, v[2] * k]
}
