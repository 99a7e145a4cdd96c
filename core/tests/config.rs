//! Configuration tests: defaults, overrides, validation.

use bhkick_core::{
    config::{ClusterParams, SimConfig, SpinDistribution},
    engine::MergerEngine,
    error::SimError,
    mass_sampler::LOOKUP_MIN_BH_STAR,
};

#[test]
fn omitted_keys_take_defaults() {
    let config = SimConfig::from_params(&ClusterParams::default()).unwrap();
    assert_eq!(config, SimConfig::default());
    assert_eq!(config.cluster_mass, 1e6);
    assert_eq!(config.radius, 2.0);
    assert_eq!(config.imf_alpha, 2.35);
    assert_eq!(config.rand_spin_type, SpinDistribution::Uniform);
}

#[test]
fn json_params_override_defaults() {
    let params: ClusterParams = serde_json::from_str(
        r#"{ "cluster_mass": 5e5, "radius": 3, "rand_spin_type": "zero", "vel_thresh": 0.5 }"#,
    )
    .unwrap();
    let config = SimConfig::from_params(&params).unwrap();

    assert_eq!(config.cluster_mass, 5e5);
    assert_eq!(config.radius, 3.0);
    assert_eq!(config.vel_thresh, 0.5);
    assert_eq!(config.rand_spin_type, SpinDistribution::Zero);
    assert_eq!(config.min_bh_star, 10.0);
}

#[test]
fn unknown_keys_are_rejected() {
    let parsed: Result<ClusterParams, _> = serde_json::from_str(r#"{ "cluster_mas": 5e5 }"#);
    assert!(parsed.is_err());
}

#[test]
fn mass_lookup_overrides_min_bh_star() {
    let params = ClusterParams {
        use_mass_lookup: Some(true),
        min_bh_star: Some(25.0),
        ..ClusterParams::default()
    };
    let config = SimConfig::from_params(&params).unwrap();
    assert!(config.use_mass_lookup);
    assert_eq!(config.min_bh_star, LOOKUP_MIN_BH_STAR);
}

#[test]
fn validation_rejects_broken_ranges() {
    let cases = [
        SimConfig { bh_mass_frac: 0.0, ..SimConfig::default() },
        SimConfig { bh_mass_frac: 1.5, ..SimConfig::default() },
        SimConfig { min_star: 200.0, ..SimConfig::default() },
        SimConfig { min_bh_star: 100.0, ..SimConfig::default() },
        SimConfig { min_bh_star: 0.5, ..SimConfig::default() },
        SimConfig { radius: -1.0, ..SimConfig::default() },
        SimConfig { cluster_mass: f64::NAN, ..SimConfig::default() },
        SimConfig { vel_thresh: -0.1, ..SimConfig::default() },
        SimConfig { use_mass_lookup: true, ..SimConfig::default() },
    ];
    for config in cases {
        assert!(
            matches!(config.validate(), Err(SimError::InvalidConfig { .. })),
            "expected rejection: {config:?}"
        );
    }
}

#[test]
fn engine_refuses_invalid_config_before_drawing() {
    let bad = SimConfig { min_bh_star: 150.0, ..SimConfig::default_test() };
    assert!(matches!(
        MergerEngine::new(bad, 1),
        Err(SimError::InvalidConfig { key: "min_bh_star", .. })
    ));

    // Lookup curve ends at 100 Msun; a heavier progenitor range cannot be mapped.
    let bad_lookup = SimConfig {
        use_mass_lookup: true,
        max_star: 150.0,
        ..SimConfig::default_test()
    };
    assert!(matches!(
        MergerEngine::new(bad_lookup, 1),
        Err(SimError::InvalidConfig { key: "use_mass_lookup", .. })
    ));
}

#[test]
fn engine_applies_lookup_override_to_direct_configs() {
    let config = SimConfig { use_mass_lookup: true, ..SimConfig::default_test() };
    assert_eq!(config.min_bh_star, 10.0, "struct literal keeps the raw default");

    let engine = MergerEngine::new(config, 1).unwrap();
    assert_eq!(engine.config().min_bh_star, LOOKUP_MIN_BH_STAR);

    let resolved = SimConfig::from_params(&ClusterParams {
        cluster_mass: Some(1e4),
        use_mass_lookup: Some(true),
        rand_spin_type: Some(SpinDistribution::Zero),
        ..ClusterParams::default()
    })
    .unwrap();
    let resolved_engine = MergerEngine::new(resolved, 1).unwrap();
    assert_eq!(
        engine.cluster().target_count(),
        resolved_engine.cluster().target_count(),
        "target count must use the overridden progenitor range"
    );

    // Curve minimum over [16.2, 100] is ~2.5 Msun.
    let lightest = engine
        .cluster()
        .holes()
        .iter()
        .map(|h| h.mass)
        .fold(f64::INFINITY, f64::min);
    assert!(lightest >= 2.0, "lookup hole below the curve: {lightest}");
}

#[test]
fn config_round_trips_through_json() {
    let config = SimConfig::default_test();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"rand_spin_type\":\"zero\""));
    let back: SimConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
