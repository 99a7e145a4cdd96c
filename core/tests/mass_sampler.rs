//! Mass sampling tests: the power-law quantile and the lookup curve.

use bhkick_core::{
    config::SimConfig,
    error::SimError,
    mass_sampler::{MassLookup, MassSampler, MassTransform, PowerLawQuantile, LOOKUP_MIN_BH_STAR},
    rng::SimRng,
};

#[test]
fn quantile_spans_the_mass_range() {
    let q = PowerLawQuantile::new(2.35, 10.0, 100.0).unwrap();
    assert!((q.eval(0.0) - 10.0).abs() < 1e-9);
    assert!((q.eval(1.0) - 100.0).abs() < 1e-9);

    let samples: Vec<f64> = (0..=100).map(|i| q.eval(i as f64 / 100.0)).collect();
    assert!(
        samples.windows(2).all(|w| w[1] > w[0]),
        "quantile must be strictly increasing"
    );
}

#[test]
fn quantile_inverts_the_cdf() {
    for alpha in [1.5, 2.0, 2.35, 3.25] {
        let q = PowerLawQuantile::new(alpha, 10.0, 100.0).unwrap();
        for p in [0.0, 0.1, 0.37, 0.5, 0.9, 0.999] {
            let back = q.cdf(q.eval(p));
            assert!((back - p).abs() < 1e-9, "alpha={alpha} p={p} -> {back}");
        }
    }
}

#[test]
fn alpha_two_is_log_uniform() {
    let q = PowerLawQuantile::new(2.0, 10.0, 1000.0).unwrap();
    assert!((q.eval(0.5) - 100.0).abs() < 1e-9);
}

#[test]
fn bad_ranges_fail_inversion() {
    for (alpha, min, max) in [(2.35, 100.0, 10.0), (2.35, 0.0, 10.0), (f64::NAN, 10.0, 100.0)] {
        let result = PowerLawQuantile::new(alpha, min, max);
        assert!(
            matches!(result, Err(SimError::QuantileInversion { .. })),
            "({alpha}, {min}, {max}) should not invert: {result:?}"
        );
    }
}

#[test]
fn lookup_interpolates_between_knots() {
    let lookup = MassLookup::spera_mapelli();
    assert!((lookup.interpolate(8.0).unwrap() - 1.3).abs() < 1e-12);
    assert!((lookup.interpolate(100.0).unwrap() - 41.9).abs() < 1e-12);
    // Halfway between (8.0, 1.3) and (13.8, 1.4).
    assert!((lookup.interpolate(10.9).unwrap() - 1.35).abs() < 1e-12);
    // Halfway between (59.8, 53.4) and (65.5, 48.5): the curve is not monotonic.
    assert!((lookup.interpolate(62.65).unwrap() - 50.95).abs() < 1e-9);
}

#[test]
fn lookup_is_undefined_outside_knots() {
    let lookup = MassLookup::spera_mapelli();
    for mass in [7.99, 100.01] {
        assert!(matches!(
            lookup.interpolate(mass),
            Err(SimError::LookupOutOfRange { .. })
        ));
    }
}

#[test]
fn lookup_rejects_unsorted_knots() {
    assert!(MassLookup::new(vec![(10.0, 1.0), (5.0, 2.0)]).is_err());
    assert!(MassLookup::new(vec![(10.0, 1.0)]).is_err());
}

#[test]
fn lookup_must_cover_progenitor_range() {
    let quantile = PowerLawQuantile::new(2.35, LOOKUP_MIN_BH_STAR, 150.0).unwrap();
    let result = MassSampler::new(quantile, MassTransform::Lookup(MassLookup::spera_mapelli()));
    assert!(matches!(
        result,
        Err(SimError::InvalidConfig { key: "use_mass_lookup", .. })
    ));
}

#[test]
fn fraction_transform_scales_progenitor() {
    let sampler = MassSampler::from_config(&SimConfig::default()).unwrap();
    let mut rng = SimRng::new(2024);
    let masses: Vec<f64> = (0..10_000).map(|_| sampler.draw(&mut rng).unwrap()).collect();

    assert!(masses.iter().all(|&m| (5.0..=50.0).contains(&m)), "mass outside [5, 50]");

    // Empirical median against the analytic one.
    let mut sorted = masses.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = sorted[sorted.len() / 2];
    let expected = 0.5 * sampler.quantile().eval(0.5);
    assert!(
        (median - expected).abs() / expected < 0.05,
        "median {median:.2} vs analytic {expected:.2}"
    );
}

#[test]
fn lookup_sampler_stays_on_the_curve() {
    let config = SimConfig {
        use_mass_lookup: true,
        min_bh_star: LOOKUP_MIN_BH_STAR,
        ..SimConfig::default()
    };
    let sampler = MassSampler::from_config(&config).unwrap();
    let mut rng = SimRng::new(5);
    for _ in 0..1000 {
        let m = sampler.draw(&mut rng).unwrap();
        // Curve minimum over [16.2, 100] is ~2.5, maximum 53.4.
        assert!((2.0..=53.4).contains(&m), "lookup mass {m}");
    }
}
