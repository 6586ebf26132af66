//! Weighted quick-union with path compression.
//!
//! Every component-discovery pass works over a dense `0..n` relabelling of the
//! hyperedges in the current view, so the forest stores plain indices and the
//! caller keeps the translation table.

/// Disjoint-set forest over `0..n`.
///
/// # Examples
/// ```
/// use hypeq_core::DisjointSet;
///
/// let mut forest = DisjointSet::new(4);
/// assert!(forest.union(0, 1));
/// assert!(!forest.union(1, 0));
/// assert!(forest.same_component(0, 1));
/// assert_eq!(forest.count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<usize>,
    count: usize,
}

impl DisjointSet {
    /// Creates `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            count: n,
        }
    }

    /// Number of elements in the forest.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.parent.len() }

    /// Whether the forest is empty.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.parent.is_empty() }

    /// Number of live components.
    #[must_use]
    #[rustfmt::skip]
    pub const fn count(&self) -> usize { self.count }

    /// Root of the tree containing `node`, compressing the walked path.
    ///
    /// # Panics
    /// Panics when `node` is not below [`Self::len`].
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Whether `left` and `right` share a root.
    ///
    /// # Panics
    /// Panics when either index is not below [`Self::len`].
    pub fn same_component(&mut self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }

    /// Merges the sets containing `left` and `right`, attaching the lower
    /// ranked root below the higher ranked one.
    ///
    /// Returns `true` when two distinct components were merged.
    ///
    /// # Panics
    /// Panics when either index is not below [`Self::len`].
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return false;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        self.count -= 1;
        true
    }

    /// Seeds the forest with a group already known to be connected.
    ///
    /// The first member becomes the shared parent and its rank is set to the
    /// group size. Members must still be singletons.
    ///
    /// # Panics
    /// Panics when a member is not below [`Self::len`].
    pub fn initialize_from_component(&mut self, members: &[usize]) {
        let Some((&head, rest)) = members.split_first() else {
            return;
        };
        self.rank[head] = members.len();
        for &member in rest {
            if self.parent[member] == member && member != head {
                self.parent[member] = head;
                self.count -= 1;
            }
        }
    }

    /// Groups `0..n` by root, ordered by smallest member, members ascending.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root = vec![usize::MAX; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::with_capacity(self.count);
        for node in 0..self.parent.len() {
            let root = self.find(node);
            let slot = slot_of_root[root];
            if slot == usize::MAX {
                slot_of_root[root] = groups.len();
                groups.push(vec![node]);
            } else {
                groups[slot].push(node);
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests;
