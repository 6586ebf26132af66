//! Exact s-distances, closeness and nearest elements.
//!
//! These traversals answer the same questions as [`crate::DistanceOracle`]
//! without landmarks and serve as ground truth for its estimates. They read
//! the overlap index installed on the hypergraph; build it with
//! [`Hypergraph::compute_overlaps`] for thresholds up to the largest one
//! queried.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::instrument;

use crate::{
    Result,
    config::QueryKind,
    hypergraph::{BfsCap, EdgeId, Hypergraph, VertexId},
    oracle::{as_vertex, check_elements},
    profile::DistanceProfile,
};

/// Element labels and the label a nearest-element search keeps.
///
/// Labels compare case-insensitively; with no wanted label, only unlabelled
/// elements match.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
///
/// use hypeq_core::exact::LabelFilter;
///
/// let labels = HashMap::from([(0, "Red".to_owned()), (1, "blue".to_owned())]);
/// let filter = LabelFilter::new(&labels, Some("red"));
/// assert!(filter.matches(0));
/// assert!(!filter.matches(1));
/// assert!(!filter.matches(2));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LabelFilter<'a> {
    labels: &'a HashMap<usize, String>,
    wanted: Option<&'a str>,
}

impl<'a> LabelFilter<'a> {
    /// Keeps elements labelled `wanted`.
    #[must_use]
    pub const fn new(labels: &'a HashMap<usize, String>, wanted: Option<&'a str>) -> Self {
        Self { labels, wanted }
    }

    /// Keeps elements sharing the label of `source`.
    #[must_use]
    pub fn of_source(labels: &'a HashMap<usize, String>, source: usize) -> Self {
        Self::new(labels, labels.get(&source).map(String::as_str))
    }

    /// Whether `element` carries the wanted label.
    #[must_use]
    pub fn matches(&self, element: usize) -> bool {
        match (self.labels.get(&element), self.wanted) {
            (Some(label), Some(wanted)) => label.eq_ignore_ascii_case(wanted),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Exact s-distance between hyperedges; `None` when either is smaller than
/// `s` or they are not s-connected.
#[must_use]
pub fn edge_distance(graph: &Hypergraph, first: EdgeId, second: EdgeId, s: usize) -> Option<u32> {
    if graph.size_of(first) < s || graph.size_of(second) < s {
        return None;
    }
    graph
        .bidirectional_sp_search(first, second, s, graph.num_edges())
        .map(|path| path.distance())
}

/// Exact s-distance between vertices: zero for a vertex with itself, one
/// for vertices sharing an s-hyperedge, otherwise the shortest distance
/// between their s-hyperedges.
#[must_use]
pub fn vertex_distance(graph: &Hypergraph, first: VertexId, second: VertexId, s: usize) -> Option<u32> {
    let left: Vec<EdgeId> = graph.s_edges_of(first, s).collect();
    if left.is_empty() {
        return None;
    }
    if first == second {
        return Some(0);
    }
    let right: Vec<EdgeId> = graph.s_edges_of(second, s).collect();
    left.iter()
        .flat_map(|&a| right.iter().map(move |&b| (a, b)))
        .filter_map(|(a, b)| edge_distance(graph, a, b, s))
        .min()
        .map(|distance| distance.max(1))
}

/// Exact s-distance from `vertex` to `edge`: the shortest distance from an
/// s-hyperedge of `vertex`, zero when `edge` contains it.
#[must_use]
pub fn vertex_edge_distance(graph: &Hypergraph, vertex: VertexId, edge: EdgeId, s: usize) -> Option<u32> {
    graph
        .s_edges_of(vertex, s)
        .filter_map(|source| edge_distance(graph, source, edge, s))
        .min()
}

fn distance_for(graph: &Hypergraph, first: usize, second: usize, s: usize, kind: QueryKind) -> Option<u32> {
    match kind {
        QueryKind::Edge => edge_distance(graph, first, second, s),
        QueryKind::Vertex => vertex_distance(graph, as_vertex(first), as_vertex(second), s),
        QueryKind::Both => vertex_edge_distance(graph, as_vertex(first), second, s),
    }
}

/// Exact distances between `first` and `second` for every `s` in
/// `1..=max_s` at which they are s-connected.
///
/// # Errors
/// Returns [`crate::HypeqError::Hypergraph`] when an element does not
/// belong to `graph`.
///
/// # Examples
/// ```
/// use hypeq_core::{Hypergraph, QueryKind, exact};
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(3);
/// let profile = exact::distance_profile(&graph, 0, 2, 3, QueryKind::Edge)?;
/// assert_eq!(profile.distance(1), 2.0);
/// assert_eq!(profile.len(), 1);
/// # Ok::<(), hypeq_core::HypeqError>(())
/// ```
pub fn distance_profile(
    graph: &Hypergraph,
    first: usize,
    second: usize,
    max_s: usize,
    kind: QueryKind,
) -> Result<DistanceProfile> {
    check_elements(graph, first, second, kind)?;
    let mut profile = DistanceProfile::new(first, second);
    for s in 1..=max_s {
        if let Some(distance) = distance_for(graph, first, second, s, kind) {
            profile.insert_exact(s, f64::from(distance));
        }
    }
    Ok(profile)
}

/// [`distance_profile`] for every pair, evaluated in parallel.
///
/// # Errors
/// Returns the error of the first invalid pair.
#[instrument(name = "core.exact.profiles", skip(graph, pairs), fields(pairs = pairs.len()))]
pub fn distance_profiles(
    graph: &Hypergraph,
    pairs: &[(usize, usize)],
    max_s: usize,
    kind: QueryKind,
) -> Result<Vec<DistanceProfile>> {
    pairs
        .par_iter()
        .map(|&(first, second)| distance_profile(graph, first, second, max_s, kind))
        .collect()
}

fn edge_centrality(graph: &Hypergraph, edge: EdgeId, s: usize) -> f64 {
    if graph.size_of(edge) < s {
        return 0.0;
    }
    let distances = graph.distances_from(edge, s);
    let reached = distances.len().saturating_sub(1);
    let sum: u64 = distances.iter().map(|&(_, d)| u64::from(d)).sum();
    if reached == 0 || sum == 0 {
        0.0
    } else {
        reached as f64 / sum as f64
    }
}

/// Exact s-closeness: hyperedges reached over the sum of their distances.
///
/// Hyperedges smaller than `s` or reaching nothing score zero. Vertices
/// take the maximum over their s-hyperedges.
///
/// # Errors
/// Returns [`crate::HypeqError::Hypergraph`] when `element` does not
/// belong to `graph`.
pub fn centrality(graph: &Hypergraph, element: usize, s: usize, kind: QueryKind) -> Result<f64> {
    match kind {
        QueryKind::Edge => {
            graph.check_edge(element)?;
            Ok(edge_centrality(graph, element, s))
        }
        QueryKind::Vertex | QueryKind::Both => {
            let vertex = as_vertex(element);
            graph.check_vertex(vertex)?;
            Ok(graph
                .s_edges_of(vertex, s)
                .map(|edge| edge_centrality(graph, edge, s))
                .fold(0.0, f64::max))
        }
    }
}

/// The `k` closest elements s-reachable from `source`, ordered by distance
/// then identifier and padded with `None`.
///
/// With [`QueryKind::Edge`] the source and the results are hyperedges; a
/// source smaller than `s` reaches nothing. Otherwise the source is a
/// vertex; [`QueryKind::Vertex`] ranks vertices and [`QueryKind::Both`]
/// hyperedges, including those holding the source. The source itself is
/// never returned. With a `filter`, only matching elements are ranked and
/// the traversal stops once enough of them are found.
///
/// # Errors
/// Returns [`crate::HypeqError::Hypergraph`] when `source` does not belong
/// to `graph`.
#[instrument(name = "core.exact.top_k", skip(graph, filter), fields(filtered = filter.is_some()))]
pub fn top_k_reachable(
    graph: &Hypergraph,
    source: usize,
    s: usize,
    k: usize,
    kind: QueryKind,
    filter: Option<&LabelFilter<'_>>,
) -> Result<Vec<Option<usize>>> {
    let keep = |element: usize| filter.is_none_or(|f| f.matches(element));
    let mut ranked: Vec<(u32, usize)> = match kind {
        QueryKind::Edge => {
            graph.check_edge(source)?;
            if graph.size_of(source) < s {
                Vec::new()
            } else {
                graph
                    .distances_capped(&[source], s, BfsCap::new(k), |edge| {
                        usize::from(edge != source && keep(edge))
                    })
                    .into_iter()
                    .filter(|&(edge, _)| edge != source && keep(edge))
                    .map(|(edge, distance)| (distance, edge))
                    .collect()
            }
        }
        QueryKind::Both => {
            let vertex = as_vertex(source);
            graph.check_vertex(vertex)?;
            let sources: Vec<EdgeId> = graph.s_edges_of(vertex, s).collect();
            graph
                .distances_capped(&sources, s, BfsCap::new(k), |edge| usize::from(keep(edge)))
                .into_iter()
                .filter(|&(edge, _)| keep(edge))
                .map(|(edge, distance)| (distance, edge))
                .collect()
        }
        QueryKind::Vertex => {
            let vertex = as_vertex(source);
            graph.check_vertex(vertex)?;
            nearest_vertices(graph, vertex, s, k, &keep)
        }
    };
    ranked.sort_unstable();
    let mut top: Vec<Option<usize>> = ranked
        .into_iter()
        .take(k)
        .map(|(_, element)| Some(element))
        .collect();
    top.resize(k, None);
    Ok(top)
}

/// Vertices reached from the s-hyperedges of `source` with their distances.
/// Vertices of the source hyperedges sit at distance one, so the first two
/// layers are always completed.
fn nearest_vertices(
    graph: &Hypergraph,
    source: VertexId,
    s: usize,
    k: usize,
    keep: &impl Fn(usize) -> bool,
) -> Vec<(u32, usize)> {
    let sources: Vec<EdgeId> = graph.s_edges_of(source, s).collect();
    let mut seen: HashSet<VertexId> = HashSet::new();
    let cap = BfsCap::new(k).with_min_depth(1);
    let reached = graph.distances_capped(&sources, s, cap, |edge| {
        graph
            .vertices_of(edge)
            .iter()
            .filter(|&&v| v != source && keep(v as usize) && seen.insert(v))
            .count()
    });

    let mut nearest: HashMap<VertexId, u32> = HashMap::new();
    for (edge, distance) in reached {
        for &vertex in graph.vertices_of(edge) {
            if vertex != source && keep(vertex as usize) {
                let distance = distance.max(1);
                nearest
                    .entry(vertex)
                    .and_modify(|d| *d = (*d).min(distance))
                    .or_insert(distance);
            }
        }
    }
    nearest
        .into_iter()
        .map(|(vertex, distance)| (distance, vertex as usize))
        .collect()
}
