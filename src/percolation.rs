//! Site and bond percolation clusters via union-find.

use crate::config::PercolationMode;
use crate::error::{IsingError, Result};
use crate::graph::Graph;
use crate::lattice::{Spin, SpinLattice};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::Serialize;
use tracing::debug;

// --- Union-Find ---

/// Disjoint sets over node ids with union by size and path halving.
#[derive(Debug, Clone)]
pub struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    #[inline]
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `x` and `y`. Returns false if already joined.
    #[inline]
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let (mut rx, mut ry) = (self.find(x), self.find(y));
        if rx == ry {
            return false;
        }
        if self.size[rx] < self.size[ry] {
            std::mem::swap(&mut rx, &mut ry);
        }
        self.parent[ry] = rx;
        self.size[rx] += self.size[ry];
        true
    }

    /// Size of the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let r = self.find(x);
        self.size[r]
    }
}

// --- Occupation ---

/// A concrete occupation pattern: one flag per node or one per link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccupationPattern {
    Sites(Vec<bool>),
    Bonds(Vec<bool>),
}

impl OccupationPattern {
    /// Nodes whose spin equals `target`.
    pub fn from_spins(lattice: &SpinLattice<'_>, target: Spin) -> Self {
        let t = target.value();
        Self::Sites(lattice.spins().iter().map(|&s| s == t).collect())
    }

    /// Each node occupied independently with probability `p`.
    pub fn sample_sites(graph: &Graph, p: f64, rng: &mut impl Rng) -> Result<Self> {
        let dist = bernoulli(p, "site_probability")?;
        Ok(Self::Sites((0..graph.n()).map(|_| dist.sample(rng)).collect()))
    }

    /// Each link occupied independently with probability `p`.
    pub fn sample_bonds(graph: &Graph, p: f64, rng: &mut impl Rng) -> Result<Self> {
        let dist = bernoulli(p, "bond_probability")?;
        Ok(Self::Bonds((0..graph.m()).map(|_| dist.sample(rng)).collect()))
    }

    /// Build the pattern selected by `mode`. Site mode reads `lattice`;
    /// bond mode draws from `rng`.
    pub fn for_mode(
        mode: PercolationMode,
        graph: &Graph,
        lattice: Option<&SpinLattice<'_>>,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        match mode {
            PercolationMode::Site { target } => lattice
                .map(|l| Self::from_spins(l, target))
                .ok_or_else(|| {
                    IsingError::InvalidConfiguration(
                        "site percolation needs a spin configuration".into(),
                    )
                }),
            PercolationMode::Bond { probability } => Self::sample_bonds(graph, probability, rng),
        }
    }
}

fn bernoulli(p: f64, name: &str) -> Result<Bernoulli> {
    Bernoulli::new(p)
        .map_err(|_| IsingError::InvalidConfiguration(format!("{name} {p} outside [0, 1]")))
}

// --- Analysis ---

/// A maximal connected set of nodes, members in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub size: usize,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercolationResult {
    pub n_nodes: usize,
    /// Nodes that belong to some cluster (all nodes in bond mode).
    pub occupied_nodes: usize,
    /// Largest first; ties keep ascending order of smallest member.
    pub clusters: Vec<Cluster>,
    pub giant_component_size: usize,
    /// Largest cluster size / N.
    pub giant_component_fraction: f64,
}

impl PercolationResult {
    /// `hist[s]` = number of clusters of size `s`, length N + 1.
    pub fn size_distribution(&self) -> Vec<u64> {
        let mut hist = vec![0u64; self.n_nodes + 1];
        for c in &self.clusters {
            hist[c.size] += 1;
        }
        hist
    }

    /// Σ s² / Σ s over all clusters except the largest; 0 when there are none.
    pub fn mean_finite_cluster_size(&self) -> f64 {
        let (s1, s2) = self
            .clusters
            .iter()
            .skip(1)
            .fold((0usize, 0usize), |(a, b), c| (a + c.size, b + c.size * c.size));
        if s1 == 0 { 0.0 } else { s2 as f64 / s1 as f64 }
    }

    /// Empirical percolation indicator: the giant component spans at least
    /// `min_fraction` of all nodes.
    pub fn is_percolating(&self, min_fraction: f64) -> bool {
        self.giant_component_size > 0 && self.giant_component_fraction >= min_fraction
    }
}

/// Site percolation: occupied nodes joined through occupied neighbors.
pub fn analyze_sites(graph: &Graph, occupied: impl Fn(usize) -> bool) -> Result<PercolationResult> {
    if graph.is_empty() {
        return Err(IsingError::EmptyGraph);
    }
    let mask: Vec<bool> = (0..graph.n()).map(&occupied).collect();
    let mut sets = DisjointSets::new(graph.n());
    for link in graph.links() {
        if mask[link.i] && mask[link.j] {
            sets.union(link.i, link.j);
        }
    }
    Ok(collect_clusters(graph.n(), &mut sets, |i| mask[i]))
}

/// Bond percolation: components of the occupied-link subgraph. `occupied`
/// receives link indices as in `Graph::links()`.
pub fn analyze_bonds(
    graph: &Graph,
    mut occupied: impl FnMut(usize) -> bool,
) -> Result<PercolationResult> {
    if graph.is_empty() {
        return Err(IsingError::EmptyGraph);
    }
    let mut sets = DisjointSets::new(graph.n());
    for (idx, link) in graph.links().iter().enumerate() {
        if occupied(idx) {
            sets.union(link.i, link.j);
        }
    }
    Ok(collect_clusters(graph.n(), &mut sets, |_| true))
}

/// Dispatch on the pattern kind.
pub fn analyze(graph: &Graph, pattern: &OccupationPattern) -> Result<PercolationResult> {
    match pattern {
        OccupationPattern::Sites(mask) => {
            check_len(mask.len(), graph.n(), "site")?;
            analyze_sites(graph, |i| mask[i])
        }
        OccupationPattern::Bonds(mask) => {
            check_len(mask.len(), graph.m(), "bond")?;
            analyze_bonds(graph, |e| mask[e])
        }
    }
}

fn check_len(got: usize, expected: usize, kind: &str) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(IsingError::InvalidConfiguration(format!(
            "{kind} occupation has {got} entries, expected {expected}"
        )))
    }
}

fn collect_clusters(
    n: usize,
    sets: &mut DisjointSets,
    member: impl Fn(usize) -> bool,
) -> PercolationResult {
    let mut slot = vec![usize::MAX; n];
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut occupied_nodes = 0;

    for i in (0..n).filter(|&i| member(i)) {
        occupied_nodes += 1;
        let root = sets.find(i);
        if slot[root] == usize::MAX {
            slot[root] = clusters.len();
            clusters.push(Cluster { size: 0, members: Vec::new() });
        }
        let c = &mut clusters[slot[root]];
        c.size += 1;
        c.members.push(i);
    }
    // Stable: equal sizes stay ordered by first member.
    clusters.sort_by(|a, b| b.size.cmp(&a.size));

    let giant = clusters.first().map_or(0, |c| c.size);
    debug!(n, occupied_nodes, n_clusters = clusters.len(), giant, "clusters collected");

    PercolationResult {
        n_nodes: n,
        occupied_nodes,
        clusters,
        giant_component_size: giant,
        giant_component_fraction: giant as f64 / n as f64,
    }
}
