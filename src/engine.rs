// engine.rs - Single-spin-flip Monte Carlo driver for one run

use crate::config::{SimConfig, UpdateRule};
use crate::error::{IsingError, Result};
use crate::graph::Graph;
use crate::lattice::SpinLattice;
use crate::observables::ObservableAccumulator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Uninitialized,
    Equilibrating,
    Sampling,
    Finished,
}

impl EngineState {
    fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Equilibrating => "equilibrating",
            Self::Sampling => "sampling",
            Self::Finished => "finished",
        }
    }
}

/// One measured sweep. Only emitted in the sampling phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepStatistics {
    /// Index within the sampling phase, starting at 0.
    pub sweep: usize,
    pub magnetization: f64,
    pub energy: f64,
}

/// Accept/reject counters over every trial of a run, burn-in included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AcceptanceStats {
    pub attempted: u64,
    pub accepted: u64,
    /// Accepted trials with ΔE > 0.
    pub uphill_accepted: u64,
}

impl AcceptanceStats {
    pub fn rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }
}

/// Acceptance decision for a proposed flip with energy change `delta_e`.
///
/// At `temperature == 0` no uphill move is ever accepted and no division
/// happens. Metropolis only draws for uphill moves; Glauber draws every trial.
#[inline]
pub fn accept(rule: UpdateRule, delta_e: f64, temperature: f64, rng: &mut impl Rng) -> bool {
    match rule {
        UpdateRule::Metropolis => {
            if delta_e <= 0.0 {
                true
            } else if temperature == 0.0 {
                false
            } else {
                rng.gen::<f64>() < (-delta_e / temperature).exp()
            }
        }
        UpdateRule::Glauber => {
            let u: f64 = rng.gen();
            if temperature == 0.0 {
                delta_e < 0.0 || (delta_e == 0.0 && u < 0.5)
            } else {
                u < 1.0 / (1.0 + (delta_e / temperature).exp())
            }
        }
    }
}

struct ActiveRun<'g> {
    lattice: SpinLattice<'g>,
    temperature: f64,
    rule: UpdateRule,
    burn_in_sweeps: usize,
    sample_sweeps: usize,
    burn_in_done: usize,
    samples_done: usize,
    acceptance: AcceptanceStats,
}

/// Monte Carlo engine owning the spin lattice for the duration of a run.
///
/// The lattice is only reachable read-only from outside, so nothing else can
/// mutate spins while a run is active.
pub struct MonteCarloEngine<'g> {
    graph: &'g Graph,
    state: EngineState,
    active: Option<ActiveRun<'g>>,
}

impl<'g> MonteCarloEngine<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            state: EngineState::Uninitialized,
            active: None,
        }
    }

    /// Validate `config`, seed a fresh lattice and enter `Equilibrating`
    /// (or `Sampling` directly when there is no burn-in).
    ///
    /// `rng` drives the whole run; `config.random_seed` is not read here.
    /// Any previous run is discarded.
    pub fn configure(&mut self, config: &SimConfig, rng: &mut impl Rng) -> Result<()> {
        config.check()?;
        if self.graph.is_empty() {
            return Err(IsingError::EmptyGraph);
        }
        let lattice = SpinLattice::initialize(
            self.graph,
            config.initial_spin_rule,
            &config.coupling,
            config.field,
            rng,
        )?;

        self.active = Some(ActiveRun {
            lattice,
            temperature: config.temperature,
            rule: config.update_rule,
            burn_in_sweeps: config.burn_in_sweeps,
            sample_sweeps: config.sample_sweeps,
            burn_in_done: 0,
            samples_done: 0,
            acceptance: AcceptanceStats::default(),
        });
        self.state = if config.burn_in_sweeps == 0 {
            EngineState::Sampling
        } else {
            EngineState::Equilibrating
        };
        debug!(
            n = self.graph.n(),
            temperature = config.temperature,
            field = config.field,
            burn_in = config.burn_in_sweeps,
            samples = config.sample_sweeps,
            "engine configured"
        );
        Ok(())
    }

    /// [`configure`](Self::configure) with a stream seeded from
    /// `config.random_seed`. Pass the returned generator to every later
    /// `sweep`/`run` call.
    pub fn configure_seeded(&mut self, config: &SimConfig) -> Result<ChaCha20Rng> {
        let mut rng = ChaCha20Rng::seed_from_u64(config.random_seed);
        self.configure(config, &mut rng)?;
        Ok(rng)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Read-only view of the current spin configuration.
    pub fn lattice(&self) -> Option<&SpinLattice<'g>> {
        self.active.as_ref().map(|r| &r.lattice)
    }

    pub fn acceptance(&self) -> AcceptanceStats {
        self.active.as_ref().map(|r| r.acceptance).unwrap_or_default()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.active.as_ref().map(|r| r.temperature)
    }

    /// Sweeps completed so far, burn-in included.
    pub fn completed_sweeps(&self) -> usize {
        self.active.as_ref().map_or(0, |r| r.burn_in_done + r.samples_done)
    }

    /// Perform one sweep of N uniformly chosen single-spin trials.
    ///
    /// Returns the sweep record when the sweep belonged to the sampling
    /// phase, `None` for a burn-in sweep.
    pub fn sweep(&mut self, rng: &mut impl Rng) -> Result<Option<SweepStatistics>> {
        let state = self.state;
        let run = match (state, self.active.as_mut()) {
            (EngineState::Equilibrating | EngineState::Sampling, Some(run)) => run,
            _ => {
                return Err(IsingError::InvalidState {
                    operation: "sweep",
                    state: state.name(),
                })
            }
        };

        let n = run.lattice.n();
        for _ in 0..n {
            let i = rng.gen_range(0..n);
            let delta_e = run.lattice.delta_energy_unchecked(i);
            run.acceptance.attempted += 1;
            if accept(run.rule, delta_e, run.temperature, rng) {
                run.lattice.flip_unchecked(i);
                run.acceptance.accepted += 1;
                if delta_e > 0.0 {
                    run.acceptance.uphill_accepted += 1;
                }
            }
        }

        match state {
            EngineState::Equilibrating => {
                run.burn_in_done += 1;
                if run.burn_in_done == run.burn_in_sweeps {
                    debug!(sweeps = run.burn_in_done, "burn-in complete, sampling");
                    self.state = EngineState::Sampling;
                }
                Ok(None)
            }
            _ => {
                let record = SweepStatistics {
                    sweep: run.samples_done,
                    magnetization: run.lattice.magnetization(),
                    energy: run.lattice.energy(),
                };
                run.samples_done += 1;
                if run.samples_done == run.sample_sweeps {
                    debug!(
                        samples = run.samples_done,
                        acceptance = run.acceptance.rate(),
                        "sampling complete"
                    );
                    self.state = EngineState::Finished;
                }
                Ok(Some(record))
            }
        }
    }

    /// Sweep until `Finished`, handing every sampling record to `on_record`.
    ///
    /// `stop` is polled between sweeps; when set the run ends with
    /// [`IsingError::Interrupted`] and the engine keeps its partial state.
    pub fn run_with(
        &mut self,
        rng: &mut impl Rng,
        stop: &AtomicBool,
        mut on_record: impl FnMut(SweepStatistics),
    ) -> Result<()> {
        while self.state != EngineState::Finished {
            if stop.load(Ordering::Relaxed) {
                return Err(IsingError::Interrupted {
                    completed_sweeps: self.completed_sweeps(),
                });
            }
            if let Some(record) = self.sweep(rng)? {
                on_record(record);
            }
        }
        Ok(())
    }

    /// Run to completion into a fresh accumulator with `error_blocks` blocks.
    pub fn run(
        &mut self,
        rng: &mut impl Rng,
        stop: &AtomicBool,
        error_blocks: usize,
    ) -> Result<ObservableAccumulator> {
        let temperature = self.temperature().ok_or(IsingError::InvalidState {
            operation: "run",
            state: self.state.name(),
        })?;
        let mut acc = ObservableAccumulator::new(self.graph.n(), temperature)
            .with_blocks(error_blocks)?;
        self.run_with(rng, stop, |record| acc.record(record))?;
        Ok(acc)
    }
}
