//! Reachable sets and closeness estimates derived from landmark labels.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::{
    Result,
    config::QueryKind,
    hypergraph::{EdgeId, Hypergraph},
    profile::{DistanceBounds, ReachableProfile},
};

use super::{
    DistanceOracle, SDistanceOracle,
    level::join_labels,
    query::{as_vertex, small_component_distance},
};

/// Bounds `(lower, upper)` per reached element, combined with a minimum on
/// both ends since the distance from a set of sources is the minimum over
/// its members.
type LevelBounds = BTreeMap<usize, (u32, u32)>;

fn merge_min(bounds: &mut LevelBounds, element: usize, lower: u32, upper: u32) {
    bounds
        .entry(element)
        .and_modify(|(lo, up)| {
            *lo = (*lo).min(lower);
            *up = (*up).min(upper);
        })
        .or_insert((lower, upper));
}

impl DistanceOracle {
    /// Elements reachable from `source` at every threshold with their
    /// estimated distances.
    ///
    /// With [`QueryKind::Edge`], `source` is a hyperedge and the reached
    /// elements are hyperedges. Otherwise `source` is a vertex whose
    /// hyperedges act as sources; [`QueryKind::Vertex`] reports vertices and
    /// [`QueryKind::Both`] hyperedges. The source itself is never reported.
    ///
    /// # Errors
    /// Returns [`crate::HypeqError::Hypergraph`] when `source` does not
    /// belong to `graph`.
    pub fn reachable_profile(
        &self,
        graph: &Hypergraph,
        source: usize,
        kind: QueryKind,
    ) -> Result<ReachableProfile> {
        let sources: Vec<EdgeId> = match kind {
            QueryKind::Edge => {
                graph.check_edge(source)?;
                vec![source]
            }
            QueryKind::Vertex | QueryKind::Both => {
                let vertex = as_vertex(source);
                graph.check_vertex(vertex)?;
                graph.edges_of(vertex).to_vec()
            }
        };

        let levels: Vec<(usize, LevelBounds)> = self
            .oracles
            .par_iter()
            .map(|oracle| {
                let reached = reached_edges(oracle, &sources, kind == QueryKind::Edge);
                let reached = if kind == QueryKind::Vertex {
                    reached_vertices(graph, &reached, source)
                } else {
                    reached
                };
                (oracle.s(), reached)
            })
            .collect();

        let mut profile = ReachableProfile::new(source);
        for (s, reached) in levels {
            for (element, (lower, upper)) in reached {
                let bounds = DistanceBounds::midpoint(f64::from(lower), f64::from(upper));
                profile.push(s, element, bounds);
            }
        }
        Ok(profile)
    }

    /// Closeness estimate of `element` at threshold `s` from its labels:
    /// the number of landmarks it reaches over the sum of their distances.
    ///
    /// Hyperedges in components without landmarks use the pattern estimate
    /// of their component size. Vertices take the maximum over their
    /// s-hyperedges. Elements outside every s-component score zero.
    ///
    /// # Errors
    /// Returns [`crate::HypeqError::Hypergraph`] when `element` does not
    /// belong to `graph`.
    pub fn centrality(
        &self,
        graph: &Hypergraph,
        element: usize,
        s: usize,
        kind: QueryKind,
    ) -> Result<f64> {
        match kind {
            QueryKind::Edge => {
                graph.check_edge(element)?;
                Ok(self.edge_centrality(graph, element, s))
            }
            QueryKind::Vertex | QueryKind::Both => {
                let vertex = as_vertex(element);
                graph.check_vertex(vertex)?;
                Ok(self
                    .s_edges_of(graph, vertex, s)
                    .map(|edge| self.edge_centrality(graph, edge, s))
                    .fold(0.0, f64::max))
            }
        }
    }

    fn edge_centrality(&self, graph: &Hypergraph, edge: EdgeId, s: usize) -> f64 {
        let Some(oracle) = self.oracle(s) else {
            return 0.0;
        };
        if graph.size_of(edge) < s {
            return 0.0;
        }
        let label = oracle.label(edge);
        if label.is_empty() {
            let Some(id) = self.component_of(edge, s) else {
                return 0.0;
            };
            let expected = small_component_distance(self.component_size(s, id));
            return if expected > 0.0 { 1.0 / expected } else { 0.0 };
        }
        let (count, sum) = label
            .iter()
            .filter(|&&(landmark, _)| landmark != edge)
            .fold((0_u32, 0_u64), |(count, sum), &(_, distance)| {
                (count + 1, sum + u64::from(distance))
            });
        if sum == 0 {
            0.0
        } else {
            f64::from(count) / sum as f64
        }
    }
}

/// Bounds from `sources` to every labelled hyperedge at one level. Sources
/// are skipped as targets when `skip_sources` is set.
fn reached_edges(oracle: &SDistanceOracle, sources: &[EdgeId], skip_sources: bool) -> LevelBounds {
    let mut bounds = LevelBounds::new();
    for &source in sources {
        let from = oracle.label(source);
        if from.is_empty() {
            continue;
        }
        for target in oracle.labelled_edges() {
            if target == source {
                if !skip_sources {
                    merge_min(&mut bounds, target, 0, 0);
                }
                continue;
            }
            if let Some((lower, upper)) = join_labels(from, oracle.label(target)) {
                merge_min(&mut bounds, target, lower.max(1), upper);
            }
        }
    }
    if skip_sources {
        for source in sources {
            bounds.remove(source);
        }
    }
    bounds
}

/// Projects hyperedge bounds onto the vertices of the reached hyperedges,
/// leaving out the source vertex. Distinct vertices are at least one apart.
fn reached_vertices(graph: &Hypergraph, edges: &LevelBounds, source: usize) -> LevelBounds {
    let mut bounds = LevelBounds::new();
    for (&edge, &(lower, upper)) in edges {
        for &vertex in graph.vertices_of(edge) {
            let element = vertex as usize;
            if element != source {
                merge_min(&mut bounds, element, lower.max(1), upper.max(1));
            }
        }
    }
    bounds
}
