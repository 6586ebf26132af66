//! Breadth-first traversal of the s-neighbour relation.

use std::collections::VecDeque;

use super::{EdgeId, Hypergraph};

/// Lazy single-source s-BFS yielding `(edge, distance)` in visiting order.
///
/// The source is yielded first at distance zero. Neighbours are expanded in
/// the order of the overlap index.
///
/// # Examples
/// ```
/// use hypeq_core::Hypergraph;
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(3);
/// let reached: Vec<_> = graph.bfs(0, 1).collect();
/// assert_eq!(reached, vec![(0, 0), (1, 1), (2, 2)]);
/// assert_eq!(graph.bfs(0, 2).count(), 1);
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Debug)]
pub struct SBfs<'a> {
    graph: &'a Hypergraph,
    s: usize,
    queue: VecDeque<(EdgeId, u32)>,
    visited: Vec<bool>,
}

impl Iterator for SBfs<'_> {
    type Item = (EdgeId, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let (edge, distance) = self.queue.pop_front()?;
        let next = distance.saturating_add(1);
        for neighbour in self.graph.s_neighbours_of(edge, self.s) {
            if let Some(seen) = self.visited.get_mut(neighbour) {
                if !*seen {
                    *seen = true;
                    self.queue.push_back((neighbour, next));
                }
            }
        }
        Some((edge, distance))
    }
}

impl Hypergraph {
    /// Starts an s-BFS from `source`. Unknown sources yield nothing.
    #[must_use]
    pub fn bfs(&self, source: EdgeId, s: usize) -> SBfs<'_> {
        self.bfs_from(&[source], s)
    }

    /// Starts an s-BFS from every hyperedge in `sources`, all at distance
    /// zero. Unknown and repeated sources are skipped.
    #[must_use]
    pub fn bfs_from(&self, sources: &[EdgeId], s: usize) -> SBfs<'_> {
        let mut visited = vec![false; self.num_edges()];
        let mut queue = VecDeque::new();
        for &source in sources {
            if let Some(seen) = visited.get_mut(source) {
                if !*seen {
                    *seen = true;
                    queue.push_back((source, 0));
                }
            }
        }
        SBfs {
            graph: self,
            s,
            queue,
            visited,
        }
    }

    /// Exact s-distances from `source` to every s-reachable hyperedge,
    /// including `source` itself at distance zero.
    #[must_use]
    pub fn distances_from(&self, source: EdgeId, s: usize) -> Vec<(EdgeId, u32)> {
        self.bfs(source, s).collect()
    }

    /// Multi-source s-BFS that stops early once enough matches are found.
    ///
    /// `matches` reports how many matching elements each visited hyperedge
    /// contributes. The search stops after the first complete layer at
    /// depth `cap.min_depth` or deeper where the running total reaches
    /// `cap.limit`, so every hyperedge at the stopping distance is
    /// returned.
    ///
    /// # Examples
    /// ```
    /// use hypeq_core::{BfsCap, Hypergraph};
    ///
    /// let mut graph = Hypergraph::from_edges(vec![vec![1, 2], vec![2, 3], vec![2, 4], vec![4, 5]])?;
    /// graph.compute_overlaps(1);
    /// let reached = graph.distances_capped(&[0], 1, BfsCap::new(1), |edge| usize::from(edge != 0));
    /// assert_eq!(reached, vec![(0, 0), (1, 1), (2, 1)]);
    /// # Ok::<(), hypeq_core::HypergraphError>(())
    /// ```
    pub fn distances_capped(
        &self,
        sources: &[EdgeId],
        s: usize,
        cap: BfsCap,
        mut matches: impl FnMut(EdgeId) -> usize,
    ) -> Vec<(EdgeId, u32)> {
        let mut reached = Vec::new();
        let mut found: usize = 0;
        let mut stop_at: Option<u32> = None;
        for (edge, distance) in self.bfs_from(sources, s) {
            if stop_at.is_some_and(|depth| distance > depth) {
                break;
            }
            found = found.saturating_add(matches(edge));
            reached.push((edge, distance));
            if stop_at.is_none() && found >= cap.limit {
                stop_at = Some(distance.max(cap.min_depth));
            }
        }
        reached
    }
}

/// Stopping rule for [`Hypergraph::distances_capped`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BfsCap {
    /// Matches to collect before stopping.
    pub limit: usize,
    /// Shallowest layer the search always completes.
    pub min_depth: u32,
}

impl BfsCap {
    /// Stops once `limit` matches are found.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            min_depth: 0,
        }
    }

    /// Always completes the layers up to `min_depth`.
    #[must_use]
    pub const fn with_min_depth(mut self, min_depth: u32) -> Self {
        self.min_depth = min_depth;
        self
    }
}
