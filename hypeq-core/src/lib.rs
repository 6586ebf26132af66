//! Hypeq core library.
//!
//! Approximate s-distance queries over hypergraphs: two hyperedges are
//! s-adjacent when they share at least `s` vertices, and the s-distance is
//! the length of the shortest chain of s-adjacent hyperedges between them.
//! [`DistanceOracle`] precomputes landmark distances inside the nested
//! s-connected components of a [`Hypergraph`] and answers distance,
//! reachability and closeness queries with lower and upper bounds. The
//! [`exact`] module holds the traversal-based ground truth.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod components;
mod config;
mod error;
pub mod exact;
mod hypergraph;
mod landmarks;
mod oracle;
mod profile;
mod ranking;
mod rng;
mod search;
mod union_find;

#[cfg(test)]
mod test_utils;

pub use crate::{
    components::{ComponentId, ComponentLevel, ConnectedComponents, find_s_connected_components},
    config::{LandmarkAssignment, LandmarkSelection, OracleConfig, OracleConfigBuilder, QueryKind},
    error::{HypeqError, HypeqErrorCode, HypergraphError, HypergraphErrorCode, Result},
    hypergraph::{
        BfsCap, EdgeId, Hyperedge, Hypergraph, Neighbour, SBfs, VertexId, capped_intersection_size,
    },
    landmarks::{IncrementalSelection, LandmarkSelector},
    oracle::{DistanceOracle, SDistanceOracle},
    profile::{DistanceBounds, DistanceProfile, ReachableEntry, ReachableProfile},
    ranking::{BucketRanking, buckets_from_scores, median_ranking},
    search::EdgePath,
    union_find::DisjointSet,
};
