// graph.rs - Read-only network substrate for the spin and percolation layers

use crate::error::{IsingError, Result};
use std::collections::HashSet;

/// An undirected edge with its coupling strength J.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub i: usize,
    pub j: usize,
    pub coupling: f64,
}

impl Link {
    /// The endpoint opposite `node`.
    #[inline(always)]
    pub fn other(&self, node: usize) -> usize {
        if self.i == node { self.j } else { self.i }
    }
}

/// A simple undirected graph with compressed adjacency.
///
/// Neighbors of node `i` live in `adjacency[offsets[i]..offsets[i + 1]]` as
/// `(neighbor, link index)` pairs, so a neighbor scan is a slice walk.
#[derive(Debug, Clone)]
pub struct Graph {
    n_nodes: usize,
    links: Vec<Link>,
    offsets: Vec<usize>,
    adjacency: Vec<(usize, usize)>,
}

impl Graph {
    /// Build a graph with unit couplings from an edge list.
    pub fn from_edges<I>(n_nodes: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        Self::from_weighted_edges(n_nodes, edges.into_iter().map(|(i, j)| (i, j, 1.0)))
    }

    /// Build a graph from `(i, j, J)` triples.
    ///
    /// Rejects self-loops, duplicate edges (in either orientation), endpoints
    /// outside `[0, n_nodes)` and non-finite couplings.
    pub fn from_weighted_edges<I>(n_nodes: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        for (i, j, coupling) in edges {
            if i >= n_nodes || j >= n_nodes {
                return Err(IsingError::InvalidEdge { i, j, reason: "endpoint out of range" });
            }
            if i == j {
                return Err(IsingError::InvalidEdge { i, j, reason: "self-loop" });
            }
            if !coupling.is_finite() {
                return Err(IsingError::InvalidEdge { i, j, reason: "non-finite coupling" });
            }
            if !seen.insert((i.min(j), i.max(j))) {
                return Err(IsingError::InvalidEdge { i, j, reason: "duplicate edge" });
            }
            links.push(Link { i, j, coupling });
        }

        // Counting pass, then scatter into place.
        let mut degree = vec![0usize; n_nodes];
        for link in &links {
            degree[link.i] += 1;
            degree[link.j] += 1;
        }
        let mut offsets = Vec::with_capacity(n_nodes + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        let mut cursor = offsets[..n_nodes].to_vec();
        let mut adjacency = vec![(0usize, 0usize); 2 * links.len()];
        for (idx, link) in links.iter().enumerate() {
            adjacency[cursor[link.i]] = (link.j, idx);
            cursor[link.i] += 1;
            adjacency[cursor[link.j]] = (link.i, idx);
            cursor[link.j] += 1;
        }

        Ok(Self {
            n_nodes,
            links,
            offsets,
            adjacency,
        })
    }

    /// Number of vertices.
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n_nodes
    }

    /// Number of edges.
    #[inline(always)]
    pub fn m(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_nodes == 0
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// `(neighbor, link index)` pairs of `node`. Panics if `node >= n()`;
    /// callers holding unchecked ids go through [`Graph::check_node`] first.
    #[inline(always)]
    pub fn neighbors(&self, node: usize) -> &[(usize, usize)] {
        &self.adjacency[self.offsets[node]..self.offsets[node + 1]]
    }

    #[inline(always)]
    pub fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    pub fn check_node(&self, node: usize) -> Result<()> {
        if node < self.n_nodes {
            Ok(())
        } else {
            Err(IsingError::InvalidNode { node, n_nodes: self.n_nodes })
        }
    }

    /// ⟨k⟩ = 2M / N, zero for an empty graph.
    pub fn mean_degree(&self) -> f64 {
        if self.n_nodes == 0 {
            return 0.0;
        }
        2.0 * self.m() as f64 / self.n_nodes as f64
    }

    /// Mean-field percolation threshold p_c = 1/⟨k⟩.
    ///
    /// `None` when the graph has no edges, where no finite p percolates.
    pub fn percolation_threshold(&self) -> Option<f64> {
        let k = self.mean_degree();
        if k > 0.0 { Some(1.0 / k) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_symmetric() {
        let g = Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        for link in g.links() {
            assert!(g.neighbors(link.i).iter().any(|&(nb, _)| nb == link.j));
            assert!(g.neighbors(link.j).iter().any(|&(nb, _)| nb == link.i));
        }
        assert!((0..4).all(|i| g.degree(i) == 2));
    }

    #[test]
    fn rejects_reversed_duplicate() {
        let err = Graph::from_edges(3, [(0, 1), (1, 0)]).unwrap_err();
        assert!(matches!(err, IsingError::InvalidEdge { reason: "duplicate edge", .. }));
    }
}
