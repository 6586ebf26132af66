//! Single-parent search tree backed by a bloom filter.

use std::collections::HashMap;

use super::{
    EdgePath,
    bloom::{EdgeBloom, SEARCH_FALSE_POSITIVE_RATE},
};
use crate::hypergraph::EdgeId;

/// Visited hyperedges of one side of a bidirectional search, each with the
/// parent it was first reached from.
#[derive(Debug)]
pub(super) struct SearchTree {
    parents: HashMap<EdgeId, Option<EdgeId>>,
    order: Vec<EdgeId>,
    bloom: EdgeBloom,
}

impl SearchTree {
    pub(super) fn new(root: EdgeId, estimated_size: usize) -> Self {
        let mut tree = Self {
            parents: HashMap::new(),
            order: Vec::new(),
            bloom: EdgeBloom::new(estimated_size, SEARCH_FALSE_POSITIVE_RATE),
        };
        tree.insert(root, None);
        tree
    }

    fn insert(&mut self, node: EdgeId, parent: Option<EdgeId>) {
        self.parents.insert(node, parent);
        self.order.push(node);
        self.bloom.insert(node);
    }

    pub(super) fn add(&mut self, node: EdgeId, parent: EdgeId) {
        self.insert(node, Some(parent));
    }

    pub(super) fn might_contain(&self, node: EdgeId) -> bool {
        self.bloom.might_contain(node)
    }

    /// Exact membership, consulting the bloom filter first.
    pub(super) fn contains(&self, node: EdgeId) -> bool {
        self.bloom.might_contain(node) && self.parents.contains_key(&node)
    }

    /// Hyperedges from `node` up to the root, `node` first.
    pub(super) fn path_to_root(&self, node: EdgeId) -> Vec<EdgeId> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(&Some(parent)) = self.parents.get(&current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Shortest root-to-root path through any hyperedge visited by both
    /// trees, oriented from this tree's root to the other's.
    pub(super) fn shortest_meeting_path(&self, other: &Self) -> Option<EdgePath> {
        self.order
            .iter()
            .copied()
            .filter(|&node| other.contains(node))
            .map(|meeting| {
                let mut edges = self.path_to_root(meeting);
                edges.reverse();
                edges.extend(other.path_to_root(meeting).into_iter().skip(1));
                edges
            })
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .map(EdgePath::new)
    }
}
