//! Shortest s-path searches over the s-neighbour relation.
//!
//! [`Hypergraph::bidirectional_sp_search`] finds one shortest s-path by
//! expanding one BFS layer at a time from both endpoints.
//! [`Hypergraph::find_all_paths_between`] enumerates every shortest s-path
//! from a multi-parent lattice. Both back their visited sets with a bloom
//! filter checked before the exact map.

mod bloom;
mod lattice;
mod tree;

use std::collections::VecDeque;

use crate::hypergraph::{EdgeId, Hypergraph};

use self::{lattice::SearchLattice, tree::SearchTree};

/// A sequence of hyperedges where consecutive members are s-adjacent.
///
/// # Examples
/// ```
/// use hypeq_core::Hypergraph;
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(3);
/// let path = graph.bidirectional_sp_search(0, 2, 1, 3).expect("reachable");
/// assert_eq!(path.edges(), &[0, 1, 2]);
/// assert_eq!(path.distance(), 2);
/// assert!(graph.bidirectional_sp_search(0, 2, 2, 3).is_none());
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgePath {
    edges: Vec<EdgeId>,
}

impl EdgePath {
    pub(crate) const fn new(edges: Vec<EdgeId>) -> Self {
        Self { edges }
    }

    /// Hyperedges from source to target.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[EdgeId] { &self.edges }

    /// Number of hyperedges on the path.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.edges.len() }

    /// Whether the path holds no hyperedge.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.edges.is_empty() }

    /// Number of hops: one less than the number of hyperedges.
    #[must_use]
    pub fn distance(&self) -> u32 {
        u32::try_from(self.edges.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Whether `edge` lies on the path.
    #[must_use]
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }
}

impl Hypergraph {
    /// One shortest s-path from `source` to `target`, or `None` when they
    /// are not s-connected.
    ///
    /// `estimated_size` sizes the bloom filters of both search trees.
    #[must_use]
    pub fn bidirectional_sp_search(
        &self,
        source: EdgeId,
        target: EdgeId,
        s: usize,
        estimated_size: usize,
    ) -> Option<EdgePath> {
        if source >= self.num_edges() || target >= self.num_edges() {
            return None;
        }
        if source == target {
            return Some(EdgePath::new(vec![source]));
        }
        let mut forward = SearchTree::new(source, estimated_size);
        let mut backward = SearchTree::new(target, estimated_size);
        let mut forward_queue = VecDeque::from([(source, 0_u32)]);
        let mut backward_queue = VecDeque::from([(target, 0_u32)]);
        let mut frontier = 0_u32;

        while !forward_queue.is_empty() && !backward_queue.is_empty() {
            if self.expand_layer(&mut forward_queue, &mut forward, &backward, s, frontier) {
                if let Some(path) = forward.shortest_meeting_path(&backward) {
                    return Some(path);
                }
            }
            if self.expand_layer(&mut backward_queue, &mut backward, &forward, s, frontier) {
                if let Some(path) = forward.shortest_meeting_path(&backward) {
                    return Some(path);
                }
            }
            frontier = frontier.saturating_add(1);
        }
        None
    }

    /// Pops every queued hyperedge at depth `frontier` or less and adds its
    /// unseen s-neighbours to `tree`. Returns whether a new hyperedge may
    /// already belong to `opposite`.
    fn expand_layer(
        &self,
        queue: &mut VecDeque<(EdgeId, u32)>,
        tree: &mut SearchTree,
        opposite: &SearchTree,
        s: usize,
        frontier: u32,
    ) -> bool {
        let mut met = false;
        while let Some(&(node, depth)) = queue.front() {
            if depth > frontier {
                break;
            }
            queue.pop_front();
            for neighbour in self.s_neighbours_of(node, s) {
                if tree.contains(neighbour) {
                    continue;
                }
                tree.add(neighbour, node);
                queue.push_back((neighbour, depth.saturating_add(1)));
                met |= opposite.might_contain(neighbour);
            }
        }
        met
    }

    /// Every shortest s-path from `source` to `target`, sorted; empty when
    /// they are not s-connected.
    ///
    /// # Examples
    /// ```
    /// use hypeq_core::Hypergraph;
    ///
    /// // Two routes of length two between edge 0 and edge 3.
    /// let mut graph = Hypergraph::from_edges(vec![
    ///     vec![1, 2],
    ///     vec![2, 3],
    ///     vec![1, 4],
    ///     vec![3, 4, 9],
    /// ])?;
    /// graph.compute_overlaps(2);
    /// let paths = graph.find_all_paths_between(0, 3, 1, 4);
    /// let routes: Vec<_> = paths.iter().map(|p| p.edges().to_vec()).collect();
    /// assert_eq!(routes, vec![vec![0, 1, 3], vec![0, 2, 3]]);
    /// # Ok::<(), hypeq_core::HypergraphError>(())
    /// ```
    #[must_use]
    pub fn find_all_paths_between(
        &self,
        source: EdgeId,
        target: EdgeId,
        s: usize,
        estimated_size: usize,
    ) -> Vec<EdgePath> {
        if source >= self.num_edges() || target >= self.num_edges() {
            return Vec::new();
        }
        if source == target {
            return vec![EdgePath::new(vec![source])];
        }
        let mut lattice = SearchLattice::new(source, estimated_size);
        let mut queue = VecDeque::from([(source, 0_u32)]);
        let mut target_depth: Option<u32> = None;

        while let Some((node, depth)) = queue.pop_front() {
            if target_depth.is_some_and(|limit| depth >= limit) {
                break;
            }
            for neighbour in self.s_neighbours_of(node, s) {
                let is_new = lattice.add(neighbour, node, depth);
                if !is_new {
                    continue;
                }
                if neighbour == target {
                    target_depth = Some(depth.saturating_add(1));
                } else {
                    queue.push_back((neighbour, depth.saturating_add(1)));
                }
            }
        }
        lattice.paths_to(target)
    }
}
