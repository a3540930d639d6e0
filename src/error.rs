use thiserror::Error;

/// Errors raised by the spin, statistics and percolation layers.
///
/// All of these are caller misconfiguration and are reported at the point of
/// the offending call; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsingError {
    #[error("node {node} out of range for graph with {n_nodes} nodes")]
    InvalidNode { node: usize, n_nodes: usize },

    #[error("invalid edge ({i}, {j}): {reason}")]
    InvalidEdge { i: usize, j: usize, reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{samples} samples cannot fill {blocks} error blocks of at least 2 samples each")]
    InsufficientSamples { samples: usize, blocks: usize },

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// `completed_sweeps` counts Monte Carlo sweeps only, so it is 0 for a
    /// percolation point stopped between trials.
    #[error("interrupted after {completed_sweeps} sweeps")]
    Interrupted { completed_sweeps: usize },
}

pub type Result<T> = std::result::Result<T, IsingError>;
