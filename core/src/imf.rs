//! Power-law initial mass function helpers.
//!
//! The IMF is dn/dm = a * m^-alpha. Everything here is closed form, so
//! nothing needs numerical quadrature at run time.

/// Integral of m^-s dm over [lo, hi].
pub fn power_law_integral(s: f64, lo: f64, hi: f64) -> f64 {
    let k = 1.0 - s;
    if k.abs() < 1e-12 {
        (hi / lo).ln()
    } else {
        (hi.powf(k) - lo.powf(k)) / k
    }
}

/// Expected number of black holes in a cluster of `cluster_mass` solar masses.
///
/// The normalising constant comes from requiring the mass-weighted IMF to
/// integrate to the cluster mass over [min_star, max_star]; the count is the
/// normalised IMF integrated over [min_bh_star, max_star], truncated.
pub fn black_hole_count(
    cluster_mass: f64,
    alpha: f64,
    min_star: f64,
    max_star: f64,
    min_bh_star: f64,
) -> usize {
    let a = cluster_mass / power_law_integral(alpha - 1.0, min_star, max_star);
    let n = a * power_law_integral(alpha, min_bh_star, max_star);
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}
