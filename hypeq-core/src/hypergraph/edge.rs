//! Hyperedges and overlap records.

use std::hash::{Hash, Hasher};

/// Dense identifier of a hyperedge: its position in the input.
pub type EdgeId = usize;

/// Identifier of a vertex as it appears in the input.
pub type VertexId = u32;

/// An immutable hyperedge with a sorted, duplicate-free vertex set.
///
/// Equality and hashing consider the vertex set only, so two hyperedges with
/// different identifiers but the same vertices compare equal.
///
/// # Examples
/// ```
/// use hypeq_core::Hypergraph;
///
/// let graph = Hypergraph::from_edges(vec![vec![3, 1, 2, 1], vec![2, 3, 1]])?;
/// let first = graph.edge(0).expect("edge exists");
/// assert_eq!(first.vertices(), &[1, 2, 3]);
/// assert_eq!(first, graph.edge(1).expect("edge exists"));
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Hyperedge {
    id: EdgeId,
    vertices: Box<[VertexId]>,
}

impl Hyperedge {
    pub(crate) fn new(id: EdgeId, mut vertices: Vec<VertexId>) -> Self {
        vertices.sort_unstable();
        vertices.dedup();
        Self {
            id,
            vertices: vertices.into_boxed_slice(),
        }
    }

    /// Identifier of the hyperedge.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(&self) -> EdgeId { self.id }

    /// Vertices in ascending order.
    #[must_use]
    #[rustfmt::skip]
    pub fn vertices(&self) -> &[VertexId] { &self.vertices }

    /// Number of distinct vertices.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.vertices.len() }

    /// Whether the hyperedge has no vertices. Never true for edges owned by a
    /// [`crate::Hypergraph`].
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }

    /// Whether `vertex` belongs to the hyperedge.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.binary_search(&vertex).is_ok()
    }
}

impl PartialEq for Hyperedge {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
    }
}

impl Eq for Hyperedge {}

impl Hash for Hyperedge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertices.hash(state);
    }
}

/// An adjacent hyperedge and the (capped) size of the shared vertex set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Neighbour {
    /// The adjacent hyperedge.
    pub edge: EdgeId,
    /// Number of shared vertices, capped at the largest threshold of interest.
    pub overlap: u32,
}
