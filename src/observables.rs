// observables.rs - Sampling-phase time series and derived thermodynamics

use crate::engine::SweepStatistics;
use crate::error::{IsingError, Result};
use crate::error_analysis::{batch_means_error, blocks, integrated_autocorr_time, mean, variance};
use serde::Serialize;

/// Blocking (batch-means) error bars, one per reported observable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorBars {
    pub magnetization: f64,
    pub energy: f64,
    pub susceptibility: f64,
    pub specific_heat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservableSummary {
    pub n_nodes: usize,
    pub temperature: f64,
    pub samples: usize,
    /// Blocks actually used for the error bars.
    pub blocks: usize,
    pub mean_magnetization: f64,
    pub mean_abs_magnetization: f64,
    pub mean_energy: f64,
    /// χ = N (⟨m²⟩ - ⟨m⟩²) / T
    pub susceptibility: f64,
    /// C = (⟨E²⟩ - ⟨E⟩²) / T²
    pub specific_heat: f64,
    /// U = 1 - ⟨m⁴⟩ / (3 ⟨m²⟩²)
    pub binder_cumulant: f64,
    /// Integrated autocorrelation time of m, in sweeps.
    pub tau_int_magnetization: f64,
    pub error_bars: ErrorBars,
}

fn per_block(bs: &[&[f64]], f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    bs.iter().map(|&b| f(b)).collect()
}

/// Time-series accumulator for one run's sampling phase.
///
/// Burn-in never reaches it because the engine only emits records while
/// sampling.
#[derive(Debug, Clone)]
pub struct ObservableAccumulator {
    n_nodes: usize,
    temperature: f64,
    n_blocks: usize,
    magnetization: Vec<f64>,
    energy: Vec<f64>,
}

impl ObservableAccumulator {
    pub const DEFAULT_BLOCKS: usize = 10;

    pub fn new(n_nodes: usize, temperature: f64) -> Self {
        Self {
            n_nodes,
            temperature,
            n_blocks: Self::DEFAULT_BLOCKS,
            magnetization: Vec::new(),
            energy: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, n_blocks: usize) -> Result<Self> {
        if n_blocks < 2 {
            return Err(IsingError::InvalidConfiguration(format!(
                "error_blocks must be >= 2, got {n_blocks}"
            )));
        }
        self.n_blocks = n_blocks;
        Ok(self)
    }

    pub fn record(&mut self, stats: SweepStatistics) {
        self.magnetization.push(stats.magnetization);
        self.energy.push(stats.energy);
    }

    pub fn len(&self) -> usize {
        self.magnetization.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnetization.is_empty()
    }

    pub fn magnetizations(&self) -> &[f64] {
        &self.magnetization
    }

    pub fn energies(&self) -> &[f64] {
        &self.energy
    }

    /// Fluctuation-response estimate `scale · var / T^power`.
    ///
    /// At T = 0 a vanishing variance gives 0 and any other variance diverges.
    fn response(&self, var: f64, scale: f64, power: i32) -> f64 {
        if self.temperature == 0.0 {
            if var == 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            scale * var / self.temperature.powi(power)
        }
    }

    fn susceptibility(&self, m: &[f64]) -> f64 {
        self.response(variance(m), self.n_nodes as f64, 1)
    }

    fn specific_heat(&self, e: &[f64]) -> f64 {
        self.response(variance(e), 1.0, 2)
    }

    pub fn summary(&self) -> Result<ObservableSummary> {
        let m_blocks = blocks(&self.magnetization, self.n_blocks)?;
        let e_blocks = blocks(&self.energy, self.n_blocks)?;

        let m_means = per_block(&m_blocks, mean);
        let e_means = per_block(&e_blocks, mean);
        let chi_blocks = per_block(&m_blocks, |b| self.susceptibility(b));
        let c_blocks = per_block(&e_blocks, |b| self.specific_heat(b));

        let m = &self.magnetization;
        let m2 = m.iter().map(|x| x * x).sum::<f64>() / m.len() as f64;
        let m4 = m.iter().map(|x| x.powi(4)).sum::<f64>() / m.len() as f64;
        let binder_cumulant = if m2 > 0.0 { 1.0 - m4 / (3.0 * m2 * m2) } else { 0.0 };

        Ok(ObservableSummary {
            n_nodes: self.n_nodes,
            temperature: self.temperature,
            samples: m.len(),
            blocks: m_blocks.len(),
            mean_magnetization: mean(m),
            mean_abs_magnetization: m.iter().map(|x| x.abs()).sum::<f64>() / m.len() as f64,
            mean_energy: mean(&self.energy),
            susceptibility: self.susceptibility(m),
            specific_heat: self.specific_heat(&self.energy),
            binder_cumulant,
            tau_int_magnetization: integrated_autocorr_time(m),
            error_bars: ErrorBars {
                magnetization: batch_means_error(&m_means),
                energy: batch_means_error(&e_means),
                susceptibility: batch_means_error(&chi_blocks),
                specific_heat: batch_means_error(&c_blocks),
            },
        })
    }
}
