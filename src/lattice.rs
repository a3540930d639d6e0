// lattice.rs - Spin configuration over a graph with O(degree) flip bookkeeping

use crate::config::{Coupling, InitialSpinRule};
use crate::error::{IsingError, Result};
use crate::graph::Graph;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

/// A binary spin, ±1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    #[inline(always)]
    pub fn value(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    #[inline(always)]
    fn from_value(s: i8) -> Self {
        if s > 0 { Self::Up } else { Self::Down }
    }
}

/// Spin values, resolved couplings and field for one graph.
///
/// Energy convention: E = -Σ_⟨ij⟩ J_ij s_i s_j - h Σ_i s_i.
#[derive(Debug, Clone)]
pub struct SpinLattice<'g> {
    graph: &'g Graph,
    spins: Vec<i8>,
    couplings: Vec<f64>,
    field: f64,
    spin_sum: i64,
}

impl<'g> SpinLattice<'g> {
    /// Seed every spin of `graph` according to `rule`.
    ///
    /// Only `RandomUniform` draws from `rng`, one draw per node in id order.
    pub fn initialize(
        graph: &'g Graph,
        rule: InitialSpinRule,
        coupling: &Coupling,
        field: f64,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let n = graph.n();
        let spins = match rule {
            InitialSpinRule::AllUp => vec![1i8; n],
            InitialSpinRule::AllDown => vec![-1i8; n],
            InitialSpinRule::RandomUniform(p) => {
                let up = Bernoulli::new(p).map_err(|_| {
                    IsingError::InvalidConfiguration(format!(
                        "random_uniform probability {p} outside [0, 1]"
                    ))
                })?;
                (0..n).map(|_| if up.sample(rng) { 1 } else { -1 }).collect()
            }
        };
        let couplings = coupling.resolve(graph)?;
        let spin_sum = spins.iter().map(|&s| s as i64).sum();

        Ok(Self {
            graph,
            spins,
            couplings,
            field,
            spin_sum,
        })
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.spins.len()
    }

    pub fn field(&self) -> f64 {
        self.field
    }

    pub fn couplings(&self) -> &[f64] {
        &self.couplings
    }

    pub fn get(&self, node: usize) -> Result<Spin> {
        self.graph.check_node(node)?;
        Ok(Spin::from_value(self.spins[node]))
    }

    /// Raw ±1 spin values indexed by node.
    pub fn spins(&self) -> &[i8] {
        &self.spins
    }

    pub fn spin_sum(&self) -> i64 {
        self.spin_sum
    }

    /// m = Σ s_i / N. NaN on an empty graph.
    pub fn magnetization(&self) -> f64 {
        self.spin_sum as f64 / self.n() as f64
    }

    /// Σ_j J_ij s_j over the neighbors of `node`.
    #[inline(always)]
    fn neighbor_field(&self, node: usize) -> f64 {
        self.graph
            .neighbors(node)
            .iter()
            .map(|&(nb, link)| self.couplings[link] * self.spins[nb] as f64)
            .sum()
    }

    /// Energy change that flipping `node` would cause, without flipping it.
    pub fn delta_energy(&self, node: usize) -> Result<f64> {
        self.graph.check_node(node)?;
        Ok(self.delta_energy_unchecked(node))
    }

    /// ΔE = 2 s_i (Σ_j J_ij s_j + h).
    #[inline(always)]
    pub(crate) fn delta_energy_unchecked(&self, node: usize) -> f64 {
        2.0 * self.spins[node] as f64 * (self.neighbor_field(node) + self.field)
    }

    /// Toggle `node` in place and return the resulting ΔE.
    pub fn flip(&mut self, node: usize) -> Result<f64> {
        self.graph.check_node(node)?;
        Ok(self.flip_unchecked(node))
    }

    #[inline(always)]
    pub(crate) fn flip_unchecked(&mut self, node: usize) -> f64 {
        let delta = self.delta_energy_unchecked(node);
        let s = self.spins[node];
        self.spins[node] = -s;
        self.spin_sum -= 2 * s as i64;
        delta
    }

    /// Total energy recomputed from every link. O(N + E).
    pub fn energy(&self) -> f64 {
        let bonds: f64 = self
            .graph
            .links()
            .iter()
            .zip(&self.couplings)
            .map(|(l, &j)| -j * (self.spins[l.i] * self.spins[l.j]) as f64)
            .sum();
        bonds - self.field * self.spin_sum as f64
    }

    /// Interaction energy seen by one node, -s_i Σ_j J_ij s_j.
    pub fn local_energy(&self, node: usize) -> Result<f64> {
        self.graph.check_node(node)?;
        Ok(-(self.spins[node] as f64) * self.neighbor_field(node))
    }

    /// Nodes whose local interaction energy has magnitude below `threshold`:
    /// those with frustrated or balanced neighborhoods, which flip most easily.
    pub fn susceptible_nodes(&self, threshold: f64) -> Vec<(usize, f64)> {
        (0..self.n())
            .map(|i| (i, -(self.spins[i] as f64) * self.neighbor_field(i)))
            .filter(|&(_, e)| e.abs() < threshold)
            .collect()
    }
}
