//! Multi-parent search lattice recording every shortest-path predecessor.

use std::collections::HashMap;

use super::{
    EdgePath,
    bloom::{EdgeBloom, SEARCH_FALSE_POSITIVE_RATE},
};
use crate::hypergraph::EdgeId;

#[derive(Debug)]
struct LatticeNode {
    depth: u32,
    parents: Vec<EdgeId>,
}

/// Breadth-first layers from a root where each hyperedge keeps all the
/// predecessors one layer above it.
#[derive(Debug)]
pub(super) struct SearchLattice {
    nodes: HashMap<EdgeId, LatticeNode>,
    bloom: EdgeBloom,
}

impl SearchLattice {
    pub(super) fn new(root: EdgeId, estimated_size: usize) -> Self {
        let mut bloom = EdgeBloom::new(estimated_size, SEARCH_FALSE_POSITIVE_RATE);
        bloom.insert(root);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            LatticeNode {
                depth: 0,
                parents: Vec::new(),
            },
        );
        Self { nodes, bloom }
    }

    /// Depth of `node`, consulting the bloom filter first.
    pub(super) fn depth_of(&self, node: EdgeId) -> Option<u32> {
        if !self.bloom.might_contain(node) {
            return None;
        }
        self.nodes.get(&node).map(|entry| entry.depth)
    }

    /// Records `parent` as a predecessor of `node`. A node seen for the first
    /// time is placed one layer below `parent`; returns whether it was new.
    pub(super) fn add(&mut self, node: EdgeId, parent: EdgeId, parent_depth: u32) -> bool {
        if let Some(entry) = self.nodes.get_mut(&node) {
            if entry.depth == parent_depth.saturating_add(1) && !entry.parents.contains(&parent) {
                entry.parents.push(parent);
            }
            return false;
        }
        self.nodes.insert(
            node,
            LatticeNode {
                depth: parent_depth.saturating_add(1),
                parents: vec![parent],
            },
        );
        self.bloom.insert(node);
        true
    }

    /// Every root-to-`target` path, enumerated with an explicit stack.
    pub(super) fn paths_to(&self, target: EdgeId) -> Vec<EdgePath> {
        if self.depth_of(target).is_none() {
            return Vec::new();
        }
        let mut paths = Vec::new();
        let mut stack: Vec<Vec<EdgeId>> = vec![vec![target]];
        while let Some(partial) = stack.pop() {
            let Some(&last) = partial.last() else {
                continue;
            };
            let parents = self
                .nodes
                .get(&last)
                .map_or(&[][..], |entry| entry.parents.as_slice());
            if parents.is_empty() {
                let mut edges = partial;
                edges.reverse();
                paths.push(EdgePath::new(edges));
                continue;
            }
            for &parent in parents {
                let mut next = partial.clone();
                next.push(parent);
                stack.push(next);
            }
        }
        paths.sort_unstable();
        paths
    }
}
