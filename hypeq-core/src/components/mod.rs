//! Nested s-connected components.
//!
//! [`ConnectedComponents::discover`] sweeps the overlap threshold from the
//! maximum down to 1 in a single pass, seeding each level with the partition
//! of the level above. The partition at `s + 1` always refines the partition
//! at `s`.

mod engine;
mod single;

use crate::hypergraph::{EdgeId, Hypergraph};

pub use self::single::find_s_connected_components;

/// Index of a component inside one [`ComponentLevel`].
pub type ComponentId = usize;

/// The partition of the hyperedges with at least `s` vertices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComponentLevel {
    s: usize,
    components: Vec<Vec<EdgeId>>,
    membership: Vec<Option<ComponentId>>,
}

impl ComponentLevel {
    pub(crate) fn new(s: usize, components: Vec<Vec<EdgeId>>, num_edges: usize) -> Self {
        let mut membership = vec![None; num_edges];
        for (id, component) in components.iter().enumerate() {
            for &edge in component {
                if let Some(slot) = membership.get_mut(edge) {
                    *slot = Some(id);
                }
            }
        }
        Self {
            s,
            components,
            membership,
        }
    }

    /// Overlap threshold of this level.
    #[must_use]
    #[rustfmt::skip]
    pub const fn s(&self) -> usize { self.s }

    /// Components ordered by smallest member; members ascending.
    #[must_use]
    #[rustfmt::skip]
    pub fn components(&self) -> &[Vec<EdgeId>] { &self.components }

    /// Number of components, singletons included.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.components.len() }

    /// Whether no hyperedge reaches this level.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    /// Members of component `id`.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&[EdgeId]> {
        self.components.get(id).map(Vec::as_slice)
    }

    /// Component holding `edge`, if the edge reaches this level.
    #[must_use]
    pub fn component_of(&self, edge: EdgeId) -> Option<ComponentId> {
        self.membership.get(edge).copied().flatten()
    }

    /// Size of component `id`; zero when unknown.
    #[must_use]
    pub fn size_of(&self, id: ComponentId) -> usize {
        self.components.get(id).map_or(0, Vec::len)
    }

    /// Size of the component holding `edge`; zero when the edge does not
    /// reach this level.
    #[must_use]
    pub fn component_size_of(&self, edge: EdgeId) -> usize {
        self.component_of(edge).map_or(0, |id| self.size_of(id))
    }

    /// Sizes of all components in order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.components.iter().map(Vec::len).collect()
    }

    /// Number of hyperedges with a membership at this level.
    #[must_use]
    pub fn num_members(&self) -> usize {
        self.membership.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Per-level partitions plus the transient overlap information gathered while
/// computing them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectedComponents {
    max_s: usize,
    levels: Vec<ComponentLevel>,
    partial_overlaps: Vec<(EdgeId, EdgeId, u32)>,
    candidates: Vec<Vec<(EdgeId, EdgeId)>>,
}

impl ConnectedComponents {
    /// Runs the descending sweep over `graph` for every `s` in `1..=max_s`.
    ///
    /// # Examples
    /// ```
    /// use hypeq_core::{ConnectedComponents, Hypergraph};
    ///
    /// let graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
    /// let ccs = ConnectedComponents::discover(&graph, 2);
    /// let one = ccs.level(1).expect("level 1 exists");
    /// assert_eq!(one.components(), &[vec![0, 1, 2]]);
    /// let two = ccs.level(2).expect("level 2 exists");
    /// assert_eq!(two.components(), &[vec![0], vec![1], vec![2]]);
    /// # Ok::<(), hypeq_core::HypergraphError>(())
    /// ```
    #[must_use]
    pub fn discover(graph: &Hypergraph, max_s: usize) -> Self {
        engine::sweep(graph, max_s)
    }

    /// Computes every level independently with a single-level search. Records
    /// no partial overlaps or candidates, so the overlap index must be
    /// computed eagerly.
    #[must_use]
    pub fn discover_per_level(graph: &Hypergraph, max_s: usize) -> Self {
        engine::independent_levels(graph, max_s)
    }

    /// Largest overlap threshold.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_s(&self) -> usize { self.max_s }

    /// All levels in ascending `s`.
    #[must_use]
    #[rustfmt::skip]
    pub fn levels(&self) -> &[ComponentLevel] { &self.levels }

    /// Level `s`, if `1 <= s <= max_s`.
    #[must_use]
    pub fn level(&self, s: usize) -> Option<&ComponentLevel> {
        s.checked_sub(1).and_then(|slot| self.levels.get(slot))
    }

    /// Component of `edge` at level `s`.
    #[must_use]
    pub fn component_of(&self, edge: EdgeId, s: usize) -> Option<ComponentId> {
        self.level(s).and_then(|level| level.component_of(edge))
    }

    /// Size of component `id` at level `s`; zero when unknown.
    #[must_use]
    pub fn component_size(&self, s: usize, id: ComponentId) -> usize {
        self.level(s).map_or(0, |level| level.size_of(id))
    }

    /// Largest level at which `edge` has a membership; 1 when none.
    #[must_use]
    pub fn max_membership_level(&self, edge: EdgeId) -> usize {
        self.levels
            .iter()
            .rev()
            .find(|level| level.component_of(edge).is_some())
            .map_or(1, ComponentLevel::s)
    }

    /// Pairs found to overlap in exactly `s` vertices (`max_s` or more at the
    /// top level) while they were still in different components.
    #[must_use]
    #[rustfmt::skip]
    pub fn partial_overlaps(&self) -> &[(EdgeId, EdgeId, u32)] { &self.partial_overlaps }

    /// Pairs sharing a vertex that were already connected when met at level
    /// `s`; their overlap is unknown.
    #[must_use]
    pub fn candidates(&self, s: usize) -> &[(EdgeId, EdgeId)] {
        s.checked_sub(1)
            .and_then(|slot| self.candidates.get(slot))
            .map_or(&[], Vec::as_slice)
    }

    /// Drops the transient partial overlaps and candidates once the overlap
    /// index is final.
    pub fn clear_transient(&mut self) {
        self.partial_overlaps = Vec::new();
        self.candidates = Vec::new();
    }

    /// Number of stored size entries plus memberships across levels.
    #[must_use]
    pub fn struct_size(&self) -> usize {
        self.levels
            .iter()
            .map(|level| level.len() + level.num_members())
            .sum()
    }
}
