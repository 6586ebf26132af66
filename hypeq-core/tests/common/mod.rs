//! Hypergraphs shared by the integration suites.
#![allow(dead_code, reason = "each suite uses a subset of the fixtures")]

use hypeq_core::{Hypergraph, OracleConfig, OracleConfigBuilder};

/// Three hyperedges of size three, consecutive ones sharing one vertex.
pub fn chain() -> Hypergraph {
    Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])
        .expect("chain edges are non-empty")
}

/// A one-overlap chain of four hyperedges beside a pair of hyperedges that
/// share two vertices.
pub fn two_islands() -> Hypergraph {
    Hypergraph::from_edges(vec![
        vec![1, 2, 3],
        vec![3, 4, 5],
        vec![5, 6, 7],
        vec![7, 8, 9],
        vec![20, 21, 22],
        vec![21, 22, 23],
    ])
    .expect("island edges are non-empty")
}

pub fn config(max_s: usize, lb: usize, num_landmarks: usize) -> OracleConfig {
    OracleConfigBuilder::new()
        .with_max_s(max_s)
        .with_lb(lb)
        .with_num_landmarks(num_landmarks)
        .build()
        .expect("test configuration is valid")
}
