//! Single-level component search over an arbitrary set of hyperedges.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
};

use crate::{
    hypergraph::{EdgeId, Hypergraph, VertexId},
    union_find::DisjointSet,
};

/// Partitions `edges` into s-connected components without reusing any other
/// level.
///
/// Components are ordered by smallest member and members ascend.
///
/// # Examples
/// ```
/// use hypeq_core::{Hypergraph, find_s_connected_components};
///
/// let graph = Hypergraph::from_edges(vec![vec![1, 2], vec![2, 3], vec![7, 8]])?;
/// let parts = find_s_connected_components(&graph, &[0, 1, 2], 1);
/// assert_eq!(parts, vec![vec![0, 1], vec![2]]);
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[must_use]
pub fn find_s_connected_components(
    graph: &Hypergraph,
    edges: &[EdgeId],
    s: usize,
) -> Vec<Vec<EdgeId>> {
    let mut view: Vec<EdgeId> = edges
        .iter()
        .copied()
        .filter(|&edge| edge < graph.num_edges())
        .collect();
    view.sort_unstable();
    view.dedup();

    let mut vertex_index: BTreeMap<VertexId, Vec<usize>> = BTreeMap::new();
    for (slot, &edge) in view.iter().enumerate() {
        for &vertex in graph.vertices_of(edge) {
            vertex_index.entry(vertex).or_default().push(slot);
        }
    }

    let mut forest = DisjointSet::new(view.len());
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    for list in vertex_index.values_mut() {
        list.sort_by_key(|&slot| (Reverse(graph.size_of(view[slot])), slot));
        for (i, &left) in list.iter().enumerate() {
            for &right in &list[i + 1..] {
                if forest.same_component(left, right) {
                    continue;
                }
                let count = counts.entry((left, right)).or_insert(0);
                *count += 1;
                if *count >= s {
                    forest.union(left, right);
                }
            }
        }
    }

    forest
        .groups()
        .into_iter()
        .map(|group| group.into_iter().map(|slot| view[slot]).collect())
        .collect()
}
