pub mod config;
pub mod engine;
pub mod error;
pub mod error_analysis;
pub mod experiment;
pub mod graph;
pub mod lattice;
pub mod observables;
pub mod percolation;
pub mod utils;

pub use config::{
    Coupling, ExperimentConfig, InitialSpinRule, PercolationMode, SimConfig, UpdateRule,
};
pub use engine::{AcceptanceStats, EngineState, MonteCarloEngine, SweepStatistics};
pub use error::{IsingError, Result};
pub use experiment::{run_experiment, PointReport, PointResult, SweepPoint};
pub use graph::{Graph, Link};
pub use lattice::{Spin, SpinLattice};
pub use observables::{ErrorBars, ObservableAccumulator, ObservableSummary};
pub use percolation::{analyze, analyze_bonds, analyze_sites, OccupationPattern, PercolationResult};
