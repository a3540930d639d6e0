use crate::error::{IsingError, Result};
use crate::graph::Graph;
use crate::lattice::Spin;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// How the spin lattice is seeded when a run is configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialSpinRule {
    AllUp,
    AllDown,
    /// Each spin is up independently with probability `p`.
    RandomUniform(f64),
}

/// Single-spin acceptance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    Metropolis,
    Glauber,
}

/// Coupling strengths used by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupling {
    /// Same J on every edge, ignoring graph weights.
    Uniform(f64),
    /// Use the couplings carried by the graph's links.
    GraphWeights,
    /// One J per link, indexed like `Graph::links()`.
    PerEdge(Vec<f64>),
}

impl Coupling {
    /// Resolve to one coupling per link of `graph`.
    pub fn resolve(&self, graph: &Graph) -> Result<Vec<f64>> {
        match self {
            Self::Uniform(j) => Ok(vec![*j; graph.m()]),
            Self::GraphWeights => Ok(graph.links().iter().map(|l| l.coupling).collect()),
            Self::PerEdge(js) => {
                if js.len() != graph.m() {
                    return Err(IsingError::InvalidConfiguration(format!(
                        "per-edge coupling has {} entries but graph has {} edges",
                        js.len(),
                        graph.m()
                    )));
                }
                Ok(js.clone())
            }
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::Uniform(j) => j.is_finite(),
            Self::GraphWeights => true,
            Self::PerEdge(js) => js.iter().all(|j| j.is_finite()),
        }
    }
}

fn validate_sim_config(cfg: &SimConfig) -> std::result::Result<(), ValidationError> {
    if !(cfg.temperature.is_finite() && cfg.temperature >= 0.0) {
        return Err(ValidationError::new("temperature must be finite and >= 0"));
    }
    if !cfg.field.is_finite() {
        return Err(ValidationError::new("field must be finite"));
    }
    if !cfg.coupling.is_finite() {
        return Err(ValidationError::new("coupling must be finite"));
    }
    if let InitialSpinRule::RandomUniform(p) = cfg.initial_spin_rule {
        if !(0.0..=1.0).contains(&p) {
            return Err(ValidationError::new("random_uniform probability must be in [0, 1]"));
        }
    }
    if cfg.sample_sweeps < 1 {
        return Err(ValidationError::new("sample_sweeps must be >= 1"));
    }
    if cfg.error_blocks < 2 {
        return Err(ValidationError::new("error_blocks must be >= 2"));
    }
    Ok(())
}

/// Run-time configuration for one Monte Carlo run (single source of truth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_sim_config"))]
#[serde(default)]
pub struct SimConfig {
    /// k_B·T with k_B = 1. Exactly 0 selects zero-temperature dynamics.
    pub temperature: f64,
    pub field: f64,
    pub coupling: Coupling,
    pub initial_spin_rule: InitialSpinRule,
    pub burn_in_sweeps: usize,
    pub sample_sweeps: usize,
    pub random_seed: u64,
    pub update_rule: UpdateRule,
    /// Number of contiguous blocks for batch-means error bars.
    pub error_blocks: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            field: 0.0,
            coupling: Coupling::Uniform(1.0),
            initial_spin_rule: InitialSpinRule::AllUp,
            burn_in_sweeps: 100,
            sample_sweeps: 1000,
            random_seed: 0,
            update_rule: UpdateRule::Metropolis,
            error_blocks: 10,
        }
    }
}

impl SimConfig {
    pub fn check(&self) -> Result<()> {
        check(self)
    }
}

/// Percolation rule, dispatched to one occupation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercolationMode {
    /// Nodes whose spin equals `target` are occupied.
    Site { target: Spin },
    /// Each edge is occupied independently with `probability`.
    Bond { probability: f64 },
}

impl PercolationMode {
    pub fn check(&self) -> Result<()> {
        match *self {
            Self::Bond { probability } if !(0.0..=1.0).contains(&probability) => {
                Err(IsingError::InvalidConfiguration(format!(
                    "bond_probability {probability} outside [0, 1]"
                )))
            }
            _ => Ok(()),
        }
    }
}

fn validate_experiment_config(cfg: &ExperimentConfig) -> std::result::Result<(), ValidationError> {
    if cfg.replicas < 1 {
        return Err(ValidationError::new("replicas must be >= 1"));
    }
    if cfg.percolation_trials < 1 {
        return Err(ValidationError::new("percolation_trials must be >= 1"));
    }
    Ok(())
}

/// Configuration shared by every point of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_experiment_config"))]
#[serde(default)]
pub struct ExperimentConfig {
    /// Template run; each thermal point overrides temperature and field.
    #[validate]
    pub base: SimConfig,
    /// Independent Monte Carlo replicas per thermal point.
    pub replicas: usize,
    /// Bond-occupation samples per percolation point.
    pub percolation_trials: usize,
    /// When set, site percolation on this spin value is analysed on the
    /// final configuration of the first replica of every thermal point.
    pub site_percolation: Option<Spin>,
    pub parallel: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            base: SimConfig::default(),
            replicas: 1,
            percolation_trials: 1,
            site_percolation: None,
            parallel: true,
        }
    }
}

impl ExperimentConfig {
    pub fn check(&self) -> Result<()> {
        check(self)
    }
}

fn check<T: Validate>(cfg: &T) -> Result<()> {
    cfg.validate()
        .map_err(|e| IsingError::InvalidConfiguration(format!("{e}")))
}
