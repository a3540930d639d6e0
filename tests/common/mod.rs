#![allow(dead_code)]

use ising_net::Graph;
use rand::Rng;

/// Cycle 0-1-…-(n-1)-0.
pub fn ring(n: usize) -> Graph {
    Graph::from_edges(n, (0..n).map(|i| (i, (i + 1) % n))).unwrap()
}

pub fn path(n: usize) -> Graph {
    Graph::from_edges(n, (1..n).map(|i| (i - 1, i))).unwrap()
}

pub fn complete(n: usize) -> Graph {
    let edges = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j)));
    Graph::from_edges(n, edges).unwrap()
}

/// G(n, p) with couplings drawn from [-1, 1).
pub fn random_weighted(n: usize, p: f64, rng: &mut impl Rng) -> Graph {
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen_bool(p) {
                edges.push((i, j, rng.gen_range(-1.0..1.0)));
            }
        }
    }
    Graph::from_weighted_edges(n, edges).unwrap()
}
