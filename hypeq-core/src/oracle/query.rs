//! Bounded distance queries between hyperedges and vertices.

use rayon::prelude::*;

use crate::{
    Result,
    config::QueryKind,
    hypergraph::{EdgeId, Hypergraph, VertexId},
    profile::{DistanceBounds, DistanceProfile},
};

use super::DistanceOracle;

/// Average s-distances between hyperedges of the connected patterns over
/// three, four and five vertices, from the sparsest pattern to the densest.
const THREE_VERTEX_PATTERNS: [f64; 2] = [1.3, 1.0];
const FOUR_VERTEX_PATTERNS: [f64; 4] = [1.55, 1.3, 1.16, 1.0];
const FIVE_VERTEX_PATTERNS: [f64; 7] = [1.8, 1.58, 1.42, 1.3, 1.2, 1.1, 1.0];

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Expected distance between two hyperedges of a component with `size`
/// hyperedges, used when the component holds no landmark. Components larger
/// than five share the five-vertex estimate.
pub(crate) fn small_component_distance(size: usize) -> f64 {
    match size {
        0 | 1 => 0.0,
        2 => 1.0,
        3 => mean(&THREE_VERTEX_PATTERNS),
        4 => mean(&FOUR_VERTEX_PATTERNS),
        _ => mean(&FIVE_VERTEX_PATTERNS),
    }
}

/// Converts a caller-facing element identifier into a vertex identifier.
/// Values beyond the vertex range map to one that no hyperedge contains.
pub(crate) fn as_vertex(element: usize) -> VertexId {
    VertexId::try_from(element).unwrap_or(VertexId::MAX)
}

fn closest(candidates: impl Iterator<Item = DistanceBounds>) -> DistanceBounds {
    candidates
        .filter(DistanceBounds::is_known)
        .min_by(|a, b| a.estimate.total_cmp(&b.estimate))
        .unwrap_or(DistanceBounds::UNKNOWN)
}

impl DistanceOracle {
    /// Bounds on the s-distance between hyperedges `first` and `second`.
    ///
    /// Returns [`DistanceBounds::UNKNOWN`] when `s` is out of range, when the
    /// hyperedges lie in different s-components, or when they share no
    /// landmark. Inside components of at most `lb` hyperedges without
    /// labels the bounds are `1` and the component size around a pattern
    /// estimate.
    #[must_use]
    pub fn edge_bounds(&self, first: EdgeId, second: EdgeId, s: usize) -> DistanceBounds {
        let Some(oracle) = self.oracle(s) else {
            return DistanceBounds::UNKNOWN;
        };
        if let Some(components) = &self.components {
            let Some(level) = components.level(s) else {
                return DistanceBounds::UNKNOWN;
            };
            let (Some(left), Some(right)) = (level.component_of(first), level.component_of(second))
            else {
                return DistanceBounds::UNKNOWN;
            };
            if left != right {
                return DistanceBounds::UNKNOWN;
            }
            if first == second {
                return DistanceBounds::exact(0.0);
            }
            let size = level.size_of(left);
            if size <= self.lb && !oracle.has_label(first) {
                return DistanceBounds::new(1.0, size as f64, small_component_distance(size));
            }
        } else if first == second {
            return if oracle.has_label(first) {
                DistanceBounds::exact(0.0)
            } else {
                DistanceBounds::UNKNOWN
            };
        }
        oracle
            .bounds_between(first, second)
            .map_or(DistanceBounds::UNKNOWN, |(lower, upper)| {
                DistanceBounds::midpoint(f64::from(lower.max(1)), f64::from(upper))
            })
    }

    /// Hyperedges containing `vertex` that take part in threshold `s`.
    pub(crate) fn s_edges_of<'g>(
        &'g self,
        graph: &'g Hypergraph,
        vertex: VertexId,
        s: usize,
    ) -> impl Iterator<Item = EdgeId> + 'g {
        graph.s_edges_of(vertex, s).filter(move |&edge| {
            self.components
                .as_ref()
                .is_none_or(|components| components.component_of(edge, s).is_some())
        })
    }

    /// Bounds on the s-distance between vertices `first` and `second`: exact
    /// one when an s-hyperedge holds both, otherwise the tightest estimate
    /// over pairs of their s-hyperedges.
    #[must_use]
    pub fn vertex_bounds(
        &self,
        graph: &Hypergraph,
        first: VertexId,
        second: VertexId,
        s: usize,
    ) -> DistanceBounds {
        if self.oracle(s).is_none() {
            return DistanceBounds::UNKNOWN;
        }
        let left: Vec<EdgeId> = self.s_edges_of(graph, first, s).collect();
        if left.is_empty() {
            return DistanceBounds::UNKNOWN;
        }
        if first == second {
            return DistanceBounds::exact(0.0);
        }
        let right: Vec<EdgeId> = self.s_edges_of(graph, second, s).collect();
        if left.iter().any(|edge| right.contains(edge)) {
            return DistanceBounds::exact(1.0);
        }
        closest(
            left.iter()
                .flat_map(|&a| right.iter().map(move |&b| (a, b)))
                .map(|(a, b)| self.edge_bounds(a, b, s)),
        )
    }

    /// Bounds on the s-distance between `vertex` and hyperedge `edge`: the
    /// tightest estimate over the s-hyperedges of `vertex`.
    #[must_use]
    pub fn vertex_edge_bounds(
        &self,
        graph: &Hypergraph,
        vertex: VertexId,
        edge: EdgeId,
        s: usize,
    ) -> DistanceBounds {
        closest(
            self.s_edges_of(graph, vertex, s)
                .map(|source| self.edge_bounds(source, edge, s)),
        )
    }

    /// Bounds of one element pair at threshold `s` for the given `kind`.
    /// Vertex ends are checked by the caller.
    fn bounds_for(
        &self,
        graph: &Hypergraph,
        first: usize,
        second: usize,
        s: usize,
        kind: QueryKind,
    ) -> DistanceBounds {
        match kind {
            QueryKind::Edge => self.edge_bounds(first, second, s),
            QueryKind::Vertex => self.vertex_bounds(graph, as_vertex(first), as_vertex(second), s),
            QueryKind::Both => self.vertex_edge_bounds(graph, as_vertex(first), second, s),
        }
    }

    /// Bounds between `first` and `second` for every threshold with a known
    /// bound.
    ///
    /// With [`QueryKind::Both`], `first` is a vertex and `second` a
    /// hyperedge.
    ///
    /// # Errors
    /// Returns [`crate::HypeqError::Hypergraph`] when an element does not
    /// belong to `graph`.
    pub fn distance_profile(
        &self,
        graph: &Hypergraph,
        first: usize,
        second: usize,
        kind: QueryKind,
    ) -> Result<DistanceProfile> {
        check_elements(graph, first, second, kind)?;
        let mut profile = DistanceProfile::new(first, second);
        for s in 1..=self.max_s() {
            let bounds = self.bounds_for(graph, first, second, s, kind);
            if bounds.is_known() {
                profile.insert(s, bounds);
            }
        }
        Ok(profile)
    }

    /// [`Self::distance_profile`] for every pair, evaluated in parallel.
    ///
    /// # Errors
    /// Returns the error of the first invalid pair.
    pub fn distance_profiles(
        &self,
        graph: &Hypergraph,
        pairs: &[(usize, usize)],
        kind: QueryKind,
    ) -> Result<Vec<DistanceProfile>> {
        pairs
            .par_iter()
            .map(|&(first, second)| self.distance_profile(graph, first, second, kind))
            .collect()
    }
}

/// Checks that both ends of a pair belong to `graph`.
pub(crate) fn check_elements(
    graph: &Hypergraph,
    first: usize,
    second: usize,
    kind: QueryKind,
) -> Result<()> {
    match kind {
        QueryKind::Edge => {
            graph.check_edge(first)?;
            graph.check_edge(second)?;
        }
        QueryKind::Vertex => {
            graph.check_vertex(as_vertex(first))?;
            graph.check_vertex(as_vertex(second))?;
        }
        QueryKind::Both => {
            graph.check_vertex(as_vertex(first))?;
            graph.check_edge(second)?;
        }
    }
    Ok(())
}
