//! Temperature/field and bond-probability sweeps over one graph.
//!
//! Every sweep point (and every replica or trial within it) builds its own
//! engine, lattice and RNG stream, so points are independent and can run on
//! the rayon pool in any order while results come back in input order.

use crate::config::{ExperimentConfig, PercolationMode};
use crate::engine::MonteCarloEngine;
use crate::error::{IsingError, Result};
use crate::error_analysis::{batch_means_error, mean};
use crate::graph::Graph;
use crate::observables::ObservableSummary;
use crate::percolation::{analyze, OccupationPattern, PercolationResult};
use crate::utils::rng::{stream_id, stream_rng};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SweepPoint {
    Thermal { temperature: f64, field: f64 },
    Bond { probability: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalReport {
    pub replicas: Vec<ObservableSummary>,
    /// ⟨m⟩ averaged over replicas.
    pub mean_magnetization: f64,
    /// Standard error of ⟨m⟩ across replicas; `None` with a single replica.
    pub replica_error: Option<f64>,
    /// Site clusters of the first replica's final configuration, when
    /// requested through `ExperimentConfig::site_percolation`.
    pub site_percolation: Option<PercolationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercolationSummary {
    pub probability: f64,
    pub trials: usize,
    pub mean_giant_component_fraction: f64,
    /// Standard error over trials; `None` with a single trial.
    pub giant_fraction_error: Option<f64>,
    /// Cluster-size histogram summed over trials.
    pub cluster_size_distribution: Vec<u64>,
    /// 1/⟨k⟩ for comparison with the empirical giant fraction.
    pub theoretical_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PointReport {
    Thermal(ThermalReport),
    Percolation(PercolationSummary),
}

/// Outcome of one sweep point. A failed point keeps its error and does not
/// affect its neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct PointResult {
    pub index: usize,
    pub point: SweepPoint,
    pub outcome: Result<PointReport>,
}

/// Run every point of `points` on `graph`.
///
/// Fails as a whole only for an invalid `config` or an empty graph; any
/// per-point failure (including an observed `stop`) is recorded in that
/// point's [`PointResult`].
pub fn run_experiment(
    graph: &Graph,
    config: &ExperimentConfig,
    points: &[SweepPoint],
    stop: &AtomicBool,
) -> Result<Vec<PointResult>> {
    config.check()?;
    if graph.is_empty() {
        return Err(IsingError::EmptyGraph);
    }

    let work = |(index, &point): (usize, &SweepPoint)| {
        let outcome = run_point(graph, config, index, point, stop);
        match &outcome {
            Ok(_) => info!(index, ?point, "sweep point done"),
            Err(e) => warn!(index, ?point, error = %e, "sweep point failed"),
        }
        PointResult { index, point, outcome }
    };

    let results: Vec<PointResult> = if config.parallel {
        points.par_iter().enumerate().map(work).collect()
    } else {
        points.iter().enumerate().map(work).collect()
    };
    Ok(results)
}

fn run_point(
    graph: &Graph,
    config: &ExperimentConfig,
    index: usize,
    point: SweepPoint,
    stop: &AtomicBool,
) -> Result<PointReport> {
    if stop.load(Ordering::Relaxed) {
        return Err(IsingError::Interrupted { completed_sweeps: 0 });
    }
    match point {
        SweepPoint::Thermal { temperature, field } => {
            run_thermal(graph, config, index, temperature, field, stop).map(PointReport::Thermal)
        }
        SweepPoint::Bond { probability } => {
            run_bond(graph, config, index, probability, stop).map(PointReport::Percolation)
        }
    }
}

fn run_thermal(
    graph: &Graph,
    config: &ExperimentConfig,
    index: usize,
    temperature: f64,
    field: f64,
    stop: &AtomicBool,
) -> Result<ThermalReport> {
    let mut sim = config.base.clone();
    sim.temperature = temperature;
    sim.field = field;

    let mut replicas = Vec::with_capacity(config.replicas);
    let mut site_percolation = None;

    for r in 0..config.replicas {
        let mut rng = stream_rng(sim.random_seed, stream_id(index, r));
        let mut engine = MonteCarloEngine::new(graph);
        engine.configure(&sim, &mut rng)?;
        let acc = engine.run(&mut rng, stop, sim.error_blocks)?;
        replicas.push(acc.summary()?);

        if let (0, Some(target), Some(lattice)) = (r, config.site_percolation, engine.lattice()) {
            let pattern = OccupationPattern::for_mode(
                PercolationMode::Site { target },
                graph,
                Some(lattice),
                &mut rng,
            )?;
            site_percolation = Some(analyze(graph, &pattern)?);
        }
    }

    let means: Vec<f64> = replicas.iter().map(|s| s.mean_magnetization).collect();
    Ok(ThermalReport {
        mean_magnetization: mean(&means),
        replica_error: (means.len() > 1).then(|| batch_means_error(&means)),
        replicas,
        site_percolation,
    })
}

fn run_bond(
    graph: &Graph,
    config: &ExperimentConfig,
    index: usize,
    probability: f64,
    stop: &AtomicBool,
) -> Result<PercolationSummary> {
    let mode = PercolationMode::Bond { probability };
    mode.check()?;

    let mut fractions = Vec::with_capacity(config.percolation_trials);
    let mut hist = vec![0u64; graph.n() + 1];
    for t in 0..config.percolation_trials {
        if stop.load(Ordering::Relaxed) {
            debug!(index, completed_trials = t, "bond point stopped");
            return Err(IsingError::Interrupted { completed_sweeps: 0 });
        }
        let mut rng = stream_rng(config.base.random_seed, stream_id(index, t));
        let pattern = OccupationPattern::for_mode(mode, graph, None, &mut rng)?;
        let result = analyze(graph, &pattern)?;
        for (h, c) in hist.iter_mut().zip(result.size_distribution()) {
            *h += c;
        }
        fractions.push(result.giant_component_fraction);
    }

    Ok(PercolationSummary {
        probability,
        trials: fractions.len(),
        mean_giant_component_fraction: mean(&fractions),
        giant_fraction_error: (fractions.len() > 1).then(|| batch_means_error(&fractions)),
        cluster_size_distribution: hist,
        theoretical_threshold: graph.percolation_threshold(),
    })
}
