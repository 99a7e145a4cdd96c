//! Globular cluster tests: escape velocity, target count, the escape gate.

use bhkick_core::{
    black_hole::{NewHole, Velocity},
    cluster::GlobularCluster,
    config::SimConfig,
    error::SimError,
};

fn cluster(mass: f64, radius_pc: f64) -> GlobularCluster {
    GlobularCluster::new(mass, radius_pc, 2.35, 10.0, 0.8, 100.0)
}

fn moving_hole(label: &str, speed: f64) -> NewHole {
    NewHole {
        velocity: Velocity::Vector([0.0, speed, 0.0]),
        ..NewHole::primordial(label.into(), 10.0, [0.0; 3])
    }
}

#[test]
fn escape_velocity_matches_newtonian_formula() {
    let gc = cluster(1e6, 2.0);
    // sqrt(2 G M / R) with M = 2e36 kg, R = 6.172e16 m, in km/s.
    let expected = (2.0 * 6.6743e-11 * 1e6 * 2e30 / (2.0 * 3.086e16_f64)).sqrt() / 1000.0;
    assert!(
        (gc.escape_velocity() - expected).abs() < 1e-9,
        "v_esc {} vs {expected}",
        gc.escape_velocity()
    );
    assert!(gc.escape_velocity() > 60.0 && gc.escape_velocity() < 70.0);
}

#[test]
fn escape_velocity_positive_and_monotonic() {
    let radii = [0.5, 1.0, 2.0, 5.0, 10.0];
    let by_radius: Vec<f64> = radii.iter().map(|&r| cluster(1e6, r).escape_velocity()).collect();
    assert!(by_radius.iter().all(|&v| v > 0.0));
    assert!(
        by_radius.windows(2).all(|w| w[1] < w[0]),
        "v_esc should fall with radius: {by_radius:?}"
    );

    let masses = [1e4, 1e5, 1e6, 1e7];
    let by_mass: Vec<f64> = masses.iter().map(|&m| cluster(m, 2.0).escape_velocity()).collect();
    assert!(
        by_mass.windows(2).all(|w| w[1] > w[0]),
        "v_esc should grow with mass: {by_mass:?}"
    );
}

#[test]
fn target_count_matches_numeric_integration() {
    let gc = GlobularCluster::from_config(&SimConfig::default());

    // Midpoint rule in log m, independent of the closed form.
    let integrate = |s: f64, lo: f64, hi: f64| {
        let steps = 200_000;
        let (a, b) = (lo.ln(), hi.ln());
        let h = (b - a) / steps as f64;
        (0..steps)
            .map(|i| {
                let m = (a + (i as f64 + 0.5) * h).exp();
                m.powf(-s) * m * h
            })
            .sum::<f64>()
    };
    let norm = 1e6 / integrate(1.35, 0.8, 100.0);
    let expected = norm * integrate(2.35, 10.0, 100.0);

    let diff = (gc.target_count() as f64 - expected).abs();
    assert!(diff <= 1.0, "target {} vs numeric {expected:.2}", gc.target_count());
    assert!((12_000..13_000).contains(&gc.target_count()));
}

#[test]
fn target_count_handles_alpha_two() {
    // alpha = 2 makes the normalising integral logarithmic.
    let gc = GlobularCluster::new(1e5, 2.0, 2.0, 10.0, 0.8, 100.0);
    let a = 1e5 / (100.0f64 / 0.8).ln();
    let expected = a * (1.0 / 10.0 - 1.0 / 100.0);
    assert_eq!(gc.target_count(), expected as usize);
}

#[test]
fn slow_holes_stay_fast_holes_leave() {
    let mut gc = cluster(1e6, 2.0);
    let v_esc = gc.escape_velocity();

    let (slow, slow_ejected) = gc.insert(moving_hole("slow", v_esc * 0.5));
    let (fast, fast_ejected) = gc.insert(moving_hole("fast", v_esc * 2.0));
    let (edge, edge_ejected) = gc.insert(moving_hole("edge", v_esc));

    assert!(!slow_ejected);
    assert!(fast_ejected);
    assert!(edge_ejected, "a hole exactly at escape velocity is not bound");

    assert_eq!(gc.live(), &[slow]);
    assert_eq!(gc.ejected(), &[fast, edge]);
    assert_eq!(gc.holes().len(), 3);
}

#[test]
fn remove_at_rejects_bad_index() {
    let mut gc = cluster(1e6, 2.0);
    assert!(matches!(
        gc.remove_at(0),
        Err(SimError::PopulationIndex { index: 0, len: 0 })
    ));

    let (id, _) = gc.insert(moving_hole("a", 0.0));
    assert_eq!(gc.remove_at(0).unwrap(), id);
    assert!(gc.live().is_empty());
    // The hole itself is never deleted.
    assert_eq!(gc.hole(id).unwrap().label, "a");
}

#[test]
fn sort_by_time_is_stable() {
    let mut gc = cluster(1e6, 2.0);
    let times = [5.0, 1.0, 5.0, 0.0, 1.0];
    let ids: Vec<usize> = times
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let hole = NewHole { time: t, ..moving_hole(&i.to_string(), 0.0) };
            gc.insert(hole).0
        })
        .collect();

    gc.sort_live_by_time();
    assert_eq!(gc.live(), &[ids[3], ids[1], ids[4], ids[0], ids[2]]);
}
