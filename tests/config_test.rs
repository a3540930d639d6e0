use ising_net::{
    Coupling, ExperimentConfig, InitialSpinRule, IsingError, SimConfig, Spin, UpdateRule,
};

#[test]
fn test_defaults() {
    let cfg = SimConfig::default();
    assert_eq!(cfg.temperature, 1.0);
    assert_eq!(cfg.field, 0.0);
    assert_eq!(cfg.coupling, Coupling::Uniform(1.0));
    assert_eq!(cfg.initial_spin_rule, InitialSpinRule::AllUp);
    assert_eq!(cfg.burn_in_sweeps, 100);
    assert_eq!(cfg.sample_sweeps, 1000);
    assert_eq!(cfg.update_rule, UpdateRule::Metropolis);
    assert_eq!(cfg.error_blocks, 10);
    assert!(cfg.check().is_ok());
    assert!(ExperimentConfig::default().check().is_ok());
}

#[test]
fn test_partial_json_fills_defaults() {
    let cfg: SimConfig = serde_json::from_str(
        r#"{
            "temperature": 2.5,
            "update_rule": "glauber",
            "initial_spin_rule": { "random_uniform": 0.3 },
            "coupling": "graph_weights"
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.temperature, 2.5);
    assert_eq!(cfg.update_rule, UpdateRule::Glauber);
    assert_eq!(cfg.initial_spin_rule, InitialSpinRule::RandomUniform(0.3));
    assert_eq!(cfg.coupling, Coupling::GraphWeights);
    assert_eq!(cfg.sample_sweeps, 1000);

    let exp: ExperimentConfig = serde_json::from_str(
        r#"{ "replicas": 3, "site_percolation": "down", "base": { "random_seed": 9 } }"#,
    )
    .unwrap();
    assert_eq!(exp.replicas, 3);
    assert_eq!(exp.site_percolation, Some(Spin::Down));
    assert_eq!(exp.base.random_seed, 9);
    assert_eq!(exp.base.temperature, 1.0);
    assert!(exp.parallel);
}

#[test]
fn test_serialization_roundtrip() {
    let cfg = SimConfig {
        coupling: Coupling::PerEdge(vec![1.0, -0.5]),
        initial_spin_rule: InitialSpinRule::AllDown,
        ..SimConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: SimConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn test_validation_errors() {
    let bad = [
        SimConfig { temperature: -0.5, ..SimConfig::default() },
        SimConfig { temperature: f64::INFINITY, ..SimConfig::default() },
        SimConfig { field: f64::NAN, ..SimConfig::default() },
        SimConfig { coupling: Coupling::Uniform(f64::NAN), ..SimConfig::default() },
        SimConfig {
            initial_spin_rule: InitialSpinRule::RandomUniform(1.01),
            ..SimConfig::default()
        },
        SimConfig { sample_sweeps: 0, ..SimConfig::default() },
        SimConfig { error_blocks: 1, ..SimConfig::default() },
    ];
    for cfg in bad {
        assert!(
            matches!(cfg.check(), Err(IsingError::InvalidConfiguration(_))),
            "{cfg:?} passed validation"
        );
    }

    assert!(SimConfig { temperature: 0.0, burn_in_sweeps: 0, ..SimConfig::default() }
        .check()
        .is_ok());
}
