//! Sweeps over temperature, field and bond probability.

mod common;

use ising_net::{
    run_experiment, ExperimentConfig, InitialSpinRule, IsingError, PointReport, SimConfig, Spin,
    SweepPoint,
};
use std::sync::atomic::AtomicBool;

fn base() -> SimConfig {
    SimConfig {
        initial_spin_rule: InitialSpinRule::AllUp,
        burn_in_sweeps: 20,
        sample_sweeps: 200,
        random_seed: 7,
        ..SimConfig::default()
    }
}

fn thermal(temperature: f64) -> SweepPoint {
    SweepPoint::Thermal { temperature, field: 0.0 }
}

fn no_stop() -> AtomicBool {
    AtomicBool::new(false)
}

#[test]
fn test_partial_failure_keeps_other_points() {
    let g = common::ring(6);
    let cfg = ExperimentConfig { base: base(), ..ExperimentConfig::default() };
    let points = [
        thermal(1.0),
        thermal(-1.0),
        SweepPoint::Bond { probability: 1.5 },
        thermal(2.0),
    ];
    let results = run_experiment(&g, &cfg, &points, &no_stop()).unwrap();

    assert_eq!(results.len(), 4);
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.index, i);
        assert_eq!(r.point, points[i]);
    }
    assert!(matches!(results[0].outcome, Ok(PointReport::Thermal(_))));
    assert!(matches!(results[1].outcome, Err(IsingError::InvalidConfiguration(_))));
    assert!(matches!(results[2].outcome, Err(IsingError::InvalidConfiguration(_))));
    assert!(matches!(results[3].outcome, Ok(PointReport::Thermal(_))));
}

#[test]
fn test_points_do_not_share_state() {
    let g = common::ring(4);
    for parallel in [true, false] {
        let cfg = ExperimentConfig { base: base(), parallel, ..ExperimentConfig::default() };
        let results = run_experiment(&g, &cfg, &[thermal(10.0), thermal(0.0)], &no_stop()).unwrap();

        let Ok(PointReport::Thermal(cold)) = &results[1].outcome else {
            panic!("T = 0 point failed: {:?}", results[1].outcome);
        };
        // All-up is the ground state, so nothing may move at T = 0.
        assert_eq!(cold.mean_magnetization, 1.0);
        assert_eq!(cold.replicas[0].susceptibility, 0.0);
        assert_eq!(cold.replicas[0].mean_energy, -4.0);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let g = common::complete(8);
    let points: Vec<SweepPoint> = [0.5, 1.5, 3.0, 6.0, 12.0]
        .into_iter()
        .map(|t| SweepPoint::Thermal { temperature: t, field: 0.1 })
        .chain([SweepPoint::Bond { probability: 0.3 }])
        .collect();
    let seq = ExperimentConfig {
        base: base(),
        replicas: 2,
        percolation_trials: 3,
        parallel: false,
        ..ExperimentConfig::default()
    };
    let par = ExperimentConfig { parallel: true, ..seq.clone() };

    let a = run_experiment(&g, &seq, &points, &no_stop()).unwrap();
    let b = run_experiment(&g, &par, &points, &no_stop()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_replica_statistics() {
    let g = common::ring(8);
    let cfg = ExperimentConfig {
        base: SimConfig { temperature: 2.0, ..base() },
        replicas: 4,
        ..ExperimentConfig::default()
    };
    let results = run_experiment(&g, &cfg, &[thermal(2.0)], &no_stop()).unwrap();
    let Ok(PointReport::Thermal(report)) = &results[0].outcome else {
        panic!("thermal point failed");
    };
    assert_eq!(report.replicas.len(), 4);
    assert!(report.replica_error.is_some());
    let mean = report.replicas.iter().map(|s| s.mean_magnetization).sum::<f64>() / 4.0;
    assert!((report.mean_magnetization - mean).abs() < 1e-12);
    // Distinct streams per replica.
    assert_ne!(report.replicas[0], report.replicas[1]);

    let single = ExperimentConfig { replicas: 1, ..cfg };
    let results = run_experiment(&g, &single, &[thermal(2.0)], &no_stop()).unwrap();
    let Ok(PointReport::Thermal(report)) = &results[0].outcome else {
        panic!("thermal point failed");
    };
    assert_eq!(report.replica_error, None);
}

#[test]
fn test_stop_flag_interrupts_every_point() {
    let g = common::ring(4);
    let cfg = ExperimentConfig { base: base(), ..ExperimentConfig::default() };
    let stop = AtomicBool::new(true);
    let points = [thermal(1.0), SweepPoint::Bond { probability: 0.5 }];
    let results = run_experiment(&g, &cfg, &points, &stop).unwrap();
    assert!(results
        .iter()
        .all(|r| r.outcome == Err(IsingError::Interrupted { completed_sweeps: 0 })));
}

#[test]
fn test_bond_sweep_on_ring() {
    let g = common::ring(4);
    let cfg = ExperimentConfig {
        base: base(),
        percolation_trials: 5,
        ..ExperimentConfig::default()
    };
    let points = [SweepPoint::Bond { probability: 1.0 }, SweepPoint::Bond { probability: 0.0 }];
    let results = run_experiment(&g, &cfg, &points, &no_stop()).unwrap();

    let Ok(PointReport::Percolation(full)) = &results[0].outcome else {
        panic!("bond point failed");
    };
    assert_eq!(full.trials, 5);
    assert_eq!(full.mean_giant_component_fraction, 1.0);
    assert_eq!(full.giant_fraction_error, Some(0.0));
    assert_eq!(full.cluster_size_distribution, vec![0, 0, 0, 0, 5]);
    assert_eq!(full.theoretical_threshold, Some(0.5));

    let Ok(PointReport::Percolation(empty)) = &results[1].outcome else {
        panic!("bond point failed");
    };
    assert_eq!(empty.mean_giant_component_fraction, 0.25);
    assert_eq!(empty.cluster_size_distribution, vec![0, 20, 0, 0, 0]);
}

#[test]
fn test_site_percolation_on_final_configuration() {
    let g = common::ring(6);
    let cfg = ExperimentConfig {
        base: base(),
        site_percolation: Some(Spin::Up),
        ..ExperimentConfig::default()
    };
    let results = run_experiment(&g, &cfg, &[thermal(0.0), thermal(1.0)], &no_stop()).unwrap();

    let Ok(PointReport::Thermal(cold)) = &results[0].outcome else {
        panic!("thermal point failed");
    };
    let site = cold.site_percolation.as_ref().unwrap();
    assert_eq!(site.giant_component_fraction, 1.0);
    assert_eq!(site.occupied_nodes, 6);

    let Ok(PointReport::Thermal(warm)) = &results[1].outcome else {
        panic!("thermal point failed");
    };
    assert!(warm.site_percolation.is_some());
}

#[test]
fn test_invalid_experiment_config() {
    let g = common::ring(4);
    let bad = [
        ExperimentConfig { replicas: 0, ..ExperimentConfig::default() },
        ExperimentConfig { percolation_trials: 0, ..ExperimentConfig::default() },
        ExperimentConfig {
            base: SimConfig { error_blocks: 0, ..SimConfig::default() },
            ..ExperimentConfig::default()
        },
    ];
    for cfg in bad {
        assert!(matches!(
            run_experiment(&g, &cfg, &[thermal(1.0)], &no_stop()),
            Err(IsingError::InvalidConfiguration(_))
        ));
    }

    let empty = ising_net::Graph::from_edges(0, Vec::<(usize, usize)>::new()).unwrap();
    assert_eq!(
        run_experiment(&empty, &ExperimentConfig::default(), &[thermal(1.0)], &no_stop()),
        Err(IsingError::EmptyGraph)
    );
}

#[test]
fn test_empty_point_list() {
    let g = common::ring(4);
    let results = run_experiment(&g, &ExperimentConfig::default(), &[], &no_stop()).unwrap();
    assert!(results.is_empty());
}
