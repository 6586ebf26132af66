//! Descending multi-threshold component sweep.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use rayon::prelude::*;
use tracing::{debug, instrument};

use super::{ComponentLevel, ConnectedComponents, single::find_s_connected_components};
use crate::{
    hypergraph::{EdgeId, Hypergraph, VertexId},
    union_find::DisjointSet,
};

const UNMAPPED: usize = usize::MAX;

#[instrument(
    name = "core.components.find",
    skip(graph),
    fields(edges = graph.num_edges())
)]
pub(super) fn sweep(graph: &Hypergraph, max_s: usize) -> ConnectedComponents {
    let num_edges = graph.num_edges();
    let mut levels: Vec<ComponentLevel> = Vec::with_capacity(max_s);
    let mut partial_overlaps: Vec<(EdgeId, EdgeId, u32)> = Vec::new();
    let mut candidates: Vec<Vec<(EdgeId, EdgeId)>> = vec![Vec::new(); max_s];
    let mut indexed = vec![false; num_edges];
    let mut vertex_index: BTreeMap<VertexId, Vec<EdgeId>> = BTreeMap::new();
    let mut dense = vec![UNMAPPED; num_edges];

    for s in (1..=max_s).rev() {
        let view = graph.edges_with_min_size(s);
        dense.fill(UNMAPPED);
        for (slot, &edge) in view.iter().enumerate() {
            dense[edge] = slot;
        }

        let mut forest = DisjointSet::new(view.len());
        if let Some(above) = levels.last() {
            for component in above.components() {
                let members: Vec<usize> = component.iter().map(|&edge| dense[edge]).collect();
                forest.initialize_from_component(&members);
            }
        }
        for &(a, b, _) in &partial_overlaps {
            forest.union(dense[a], dense[b]);
        }

        index_new_edges(graph, &view, &mut indexed, &mut vertex_index);

        let level_candidates = count_overlaps(
            s,
            &vertex_index,
            &dense,
            &mut forest,
            &mut partial_overlaps,
        );
        if let Some(slot) = candidates.get_mut(s - 1) {
            *slot = level_candidates;
        }

        let components: Vec<Vec<EdgeId>> = forest
            .groups()
            .into_iter()
            .map(|group| group.into_iter().map(|slot| view[slot]).collect())
            .collect();
        debug!(s, edges = view.len(), components = components.len(), "level partitioned");
        levels.push(ComponentLevel::new(s, components, num_edges));
    }

    levels.reverse();
    ConnectedComponents {
        max_s,
        levels,
        partial_overlaps,
        candidates,
    }
}

/// Adds the hyperedges of `view` not yet indexed to the cumulative
/// vertex index and restores the decreasing-size order of touched lists.
fn index_new_edges(
    graph: &Hypergraph,
    view: &[EdgeId],
    indexed: &mut [bool],
    vertex_index: &mut BTreeMap<VertexId, Vec<EdgeId>>,
) {
    let mut touched = BTreeSet::new();
    for &edge in view {
        if indexed[edge] {
            continue;
        }
        indexed[edge] = true;
        for &vertex in graph.vertices_of(edge) {
            vertex_index.entry(vertex).or_default().push(edge);
            touched.insert(vertex);
        }
    }
    for vertex in touched {
        if let Some(list) = vertex_index.get_mut(&vertex) {
            list.sort_by_key(|&edge| (Reverse(graph.size_of(edge)), edge));
        }
    }
}

/// Counts shared vertices between pairs still in different components,
/// merging a pair once its count reaches `s`. Pairs met while already
/// connected are returned as candidates.
fn count_overlaps(
    s: usize,
    vertex_index: &BTreeMap<VertexId, Vec<EdgeId>>,
    dense: &[usize],
    forest: &mut DisjointSet,
    partial_overlaps: &mut Vec<(EdgeId, EdgeId, u32)>,
) -> Vec<(EdgeId, EdgeId)> {
    let threshold = u32::try_from(s).unwrap_or(u32::MAX);
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    let mut level_candidates = Vec::new();
    for list in vertex_index.values() {
        for (i, &a) in list.iter().enumerate() {
            let left = dense[a];
            for &b in &list[i + 1..] {
                let right = dense[b];
                if forest.same_component(left, right) {
                    level_candidates.push((a, b));
                    continue;
                }
                let count = counts.entry((left, right)).or_insert(0);
                *count += 1;
                if *count >= s {
                    partial_overlaps.push((a, b, threshold));
                    forest.union(left, right);
                }
            }
        }
    }
    level_candidates.sort_unstable();
    level_candidates.dedup();
    level_candidates
}

#[instrument(
    name = "core.components.find_per_level",
    skip(graph),
    fields(edges = graph.num_edges())
)]
pub(super) fn independent_levels(graph: &Hypergraph, max_s: usize) -> ConnectedComponents {
    let levels: Vec<ComponentLevel> = (1..=max_s)
        .into_par_iter()
        .map(|s| {
            let view = graph.edges_with_min_size(s);
            let components = find_s_connected_components(graph, &view, s);
            ComponentLevel::new(s, components, graph.num_edges())
        })
        .collect();
    ConnectedComponents {
        max_s,
        levels,
        partial_overlaps: Vec::new(),
        candidates: Vec::new(),
    }
}
