//! Hypergraph model and overlap index.
//!
//! A [`Hypergraph`] owns its hyperedges, a vertex-to-incident-edges index and,
//! once computed, the overlap neighbours of every hyperedge. The structure is
//! immutable after construction except for the one-shot installation of the
//! overlap index, which either happens eagerly
//! ([`Hypergraph::compute_overlaps`]) or lazily from the candidates found by
//! the component search ([`Hypergraph::resolve_overlaps`]).

mod edge;
mod overlap;
mod traversal;

use crate::error::HypergraphError;

pub use self::{
    edge::{EdgeId, Hyperedge, Neighbour, VertexId},
    overlap::capped_intersection_size,
    traversal::{BfsCap, SBfs},
};

/// Vertex sets plus the derived incidence and overlap indexes.
///
/// # Examples
/// ```
/// use hypeq_core::Hypergraph;
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(2);
/// assert_eq!(graph.dimension(), 3);
/// assert_eq!(graph.edges_of(3), &[0, 1]);
/// assert_eq!(graph.s_neighbours_of(1, 1).collect::<Vec<_>>(), vec![0, 2]);
/// assert_eq!(graph.s_degree(1, 2), 0);
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Hypergraph {
    edges: Vec<Hyperedge>,
    vertex_ids: Vec<VertexId>,
    incidence: Vec<Vec<EdgeId>>,
    neighbours: Vec<Vec<Neighbour>>,
    dimension: usize,
    overlaps_installed: bool,
}

impl Hypergraph {
    /// Builds a hypergraph where hyperedge `i` is the `i`-th vertex list.
    ///
    /// Duplicate vertices inside a list are collapsed.
    ///
    /// # Errors
    /// Returns [`HypergraphError::EmptyHyperedge`] when a list is empty.
    pub fn from_edges<I, E>(edges: I) -> Result<Self, HypergraphError>
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = VertexId>,
    {
        let mut owned = Vec::new();
        for (id, vertices) in edges.into_iter().enumerate() {
            let edge = Hyperedge::new(id, vertices.into_iter().collect());
            if edge.is_empty() {
                return Err(HypergraphError::EmptyHyperedge { edge: id });
            }
            owned.push(edge);
        }

        let mut pairs: Vec<(VertexId, EdgeId)> = owned
            .iter()
            .flat_map(|edge| edge.vertices().iter().map(move |&v| (v, edge.id())))
            .collect();
        pairs.sort_unstable();

        let mut vertex_ids: Vec<VertexId> = Vec::new();
        let mut incidence: Vec<Vec<EdgeId>> = Vec::new();
        for (vertex, edge) in pairs {
            if vertex_ids.last() == Some(&vertex) {
                if let Some(list) = incidence.last_mut() {
                    list.push(edge);
                }
            } else {
                vertex_ids.push(vertex);
                incidence.push(vec![edge]);
            }
        }

        let dimension = owned.iter().map(Hyperedge::len).max().unwrap_or(0);
        Ok(Self {
            neighbours: vec![Vec::new(); owned.len()],
            edges: owned,
            vertex_ids,
            incidence,
            dimension,
            overlaps_installed: false,
        })
    }

    /// Number of hyperedges.
    #[must_use]
    #[rustfmt::skip]
    pub fn num_edges(&self) -> usize { self.edges.len() }

    /// Number of distinct vertices.
    #[must_use]
    #[rustfmt::skip]
    pub fn num_vertices(&self) -> usize { self.vertex_ids.len() }

    /// Size of the largest hyperedge.
    #[must_use]
    #[rustfmt::skip]
    pub const fn dimension(&self) -> usize { self.dimension }

    /// All hyperedges in identifier order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[Hyperedge] { &self.edges }

    /// All vertices in ascending order.
    #[must_use]
    #[rustfmt::skip]
    pub fn vertices(&self) -> &[VertexId] { &self.vertex_ids }

    /// The hyperedge with identifier `edge`, if any.
    #[must_use]
    pub fn edge(&self, edge: EdgeId) -> Option<&Hyperedge> {
        self.edges.get(edge)
    }

    /// Checks that `edge` belongs to the hypergraph.
    ///
    /// # Errors
    /// Returns [`HypergraphError::UnknownEdge`] otherwise.
    pub fn check_edge(&self, edge: EdgeId) -> Result<(), HypergraphError> {
        if edge < self.edges.len() {
            Ok(())
        } else {
            Err(HypergraphError::UnknownEdge {
                edge,
                edges: self.edges.len(),
            })
        }
    }

    /// Checks that `vertex` belongs to at least one hyperedge.
    ///
    /// # Errors
    /// Returns [`HypergraphError::UnknownVertex`] otherwise.
    pub fn check_vertex(&self, vertex: VertexId) -> Result<(), HypergraphError> {
        if self.vertex_ids.binary_search(&vertex).is_ok() {
            Ok(())
        } else {
            Err(HypergraphError::UnknownVertex { vertex })
        }
    }

    /// Vertices of `edge`; empty for unknown identifiers.
    #[must_use]
    pub fn vertices_of(&self, edge: EdgeId) -> &[VertexId] {
        self.edges.get(edge).map_or(&[], Hyperedge::vertices)
    }

    /// Number of vertices of `edge`; zero for unknown identifiers.
    #[must_use]
    pub fn size_of(&self, edge: EdgeId) -> usize {
        self.edges.get(edge).map_or(0, Hyperedge::len)
    }

    /// Hyperedges containing `vertex`, ascending.
    #[must_use]
    pub fn edges_of(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertex_ids
            .binary_search(&vertex)
            .ok()
            .and_then(|slot| self.incidence.get(slot))
            .map_or(&[], Vec::as_slice)
    }

    /// Hyperedges containing `vertex` with at least `s` vertices.
    pub fn s_edges_of(&self, vertex: VertexId, s: usize) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges_of(vertex)
            .iter()
            .copied()
            .filter(move |&edge| self.size_of(edge) >= s)
    }

    /// Identifiers of hyperedges with at least `s` vertices, ascending.
    #[must_use]
    pub fn edges_with_min_size(&self, s: usize) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|edge| edge.len() >= s)
            .map(Hyperedge::id)
            .collect()
    }

    /// Whether the overlap index has been installed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn has_overlap_index(&self) -> bool { self.overlaps_installed }

    /// Overlap neighbours of `edge`, by decreasing overlap then identifier.
    #[must_use]
    pub fn neighbours_of(&self, edge: EdgeId) -> &[Neighbour] {
        self.neighbours.get(edge).map_or(&[], Vec::as_slice)
    }

    /// Neighbours of `edge` sharing at least `s` vertices.
    pub fn s_neighbours_of(&self, edge: EdgeId, s: usize) -> impl Iterator<Item = EdgeId> + '_ {
        let s = u32::try_from(s).unwrap_or(u32::MAX);
        self.neighbours_of(edge)
            .iter()
            .take_while(move |n| n.overlap >= s)
            .map(|n| n.edge)
    }

    /// Number of neighbours of `edge` sharing at least `s` vertices.
    #[must_use]
    pub fn s_degree(&self, edge: EdgeId, s: usize) -> usize {
        let s = u32::try_from(s).unwrap_or(u32::MAX);
        self.neighbours_of(edge)
            .partition_point(|n| n.overlap >= s)
    }

    /// Distinct vertices covered by `edges`.
    #[must_use]
    pub fn count_vertices_in(&self, edges: &[EdgeId]) -> usize {
        let mut vertices: Vec<VertexId> = edges
            .iter()
            .flat_map(|&edge| self.vertices_of(edge).iter().copied())
            .collect();
        vertices.sort_unstable();
        vertices.dedup();
        vertices.len()
    }

    /// Adds symmetric overlap records and restores the neighbour ordering.
    ///
    /// Repeated pairs keep the largest overlap. Pairs with an unknown
    /// endpoint, a zero overlap or identical endpoints are skipped.
    pub(crate) fn install_overlaps<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (EdgeId, EdgeId, u32)>,
    {
        let edges = self.edges.len();
        for (left, right, overlap) in pairs {
            if left == right || overlap == 0 || left >= edges || right >= edges {
                continue;
            }
            self.neighbours[left].push(Neighbour {
                edge: right,
                overlap,
            });
            self.neighbours[right].push(Neighbour {
                edge: left,
                overlap,
            });
        }
        for list in &mut self.neighbours {
            list.sort_unstable_by(|a, b| a.edge.cmp(&b.edge).then(b.overlap.cmp(&a.overlap)));
            list.dedup_by_key(|n| n.edge);
            list.sort_unstable_by(|a, b| b.overlap.cmp(&a.overlap).then(a.edge.cmp(&b.edge)));
        }
        self.overlaps_installed = true;
    }
}
