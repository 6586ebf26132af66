//! Query workloads drawn from the component structure.

use std::collections::{BTreeSet, HashSet};

use rand::{Rng, rngs::SmallRng, seq::SliceRandom};
use tracing::{debug, instrument};

use crate::{
    components::ConnectedComponents,
    config::QueryKind,
    hypergraph::{EdgeId, Hypergraph, VertexId},
    rng::task_rng,
};

use super::DistanceOracle;

const EDGE_PAIRS_SLOT: usize = 0;
const VERTEX_PAIRS_SLOT: usize = 1;

/// Random draws allowed per missing pair before a level gives up.
const DRAWS_PER_PAIR: usize = 32;

/// Adds pairs of hyperedges sharing a list to `sample` until it holds
/// `target` pairs. Only lists with more than two members take part; when they
/// hold no more pairs than needed, every pair is added.
fn sample_in_lists(
    lists: &[Vec<EdgeId>],
    sample: &mut BTreeSet<(EdgeId, EdgeId)>,
    target: usize,
    rng: &mut SmallRng,
) {
    let selectable: Vec<&Vec<EdgeId>> = lists.iter().filter(|list| list.len() > 2).collect();
    let Some(missing) = target.checked_sub(sample.len()).filter(|&m| m > 0) else {
        return;
    };
    if selectable.is_empty() {
        return;
    }

    let mut available: usize = 0;
    for list in &selectable {
        let size = list.len();
        if size > missing {
            available = size;
            break;
        }
        available = available.saturating_add(size * (size - 1) / 2);
        if available > missing {
            break;
        }
    }
    if available <= missing {
        for list in &selectable {
            for (i, &first) in list.iter().enumerate() {
                for &second in &list[i + 1..] {
                    sample.insert((first.min(second), first.max(second)));
                }
            }
        }
        return;
    }

    let mut draws = missing.saturating_mul(DRAWS_PER_PAIR);
    while sample.len() < target && draws > 0 {
        draws -= 1;
        let list = selectable[rng.gen_range(0..selectable.len())];
        let first = list[rng.gen_range(0..list.len())];
        let second = list[rng.gen_range(0..list.len())];
        if first != second {
            sample.insert((first.min(second), first.max(second)));
        }
    }
}

/// Pairs of hyperedges inside common components, apportioned across levels
/// proportionally to `s` from the top level down.
fn sample_edge_pairs(
    components: &ConnectedComponents,
    size: usize,
    rng: &mut SmallRng,
) -> BTreeSet<(EdgeId, EdgeId)> {
    let mut sample = BTreeSet::new();
    let mut remaining_weight: usize = components.levels().iter().map(|level| level.s()).sum();
    for level in components.levels().iter().rev() {
        let s = level.s();
        let target = if s == 1 {
            size
        } else {
            let share = s * size.saturating_sub(sample.len()) / remaining_weight.max(1);
            sample.len() + share
        };
        sample_in_lists(level.components(), &mut sample, target, rng);
        remaining_weight = remaining_weight.saturating_sub(s);
    }
    sample
}

/// Replaces ends of hyperedge pairs with vertices. A hyperedge contributes a
/// vertex not used by an earlier pair; pairs whose hyperedge has none left
/// are dropped.
fn to_vertex_pairs(
    graph: &Hypergraph,
    pairs: &BTreeSet<(EdgeId, EdgeId)>,
    both_ends: bool,
    rng: &mut SmallRng,
) -> Vec<(usize, usize)> {
    let mut used: HashSet<VertexId> = HashSet::new();
    let mut sample: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut pick = |edge: EdgeId, used: &mut HashSet<VertexId>| -> Option<VertexId> {
        let unused: Vec<VertexId> = graph
            .vertices_of(edge)
            .iter()
            .copied()
            .filter(|vertex| !used.contains(vertex))
            .collect();
        let vertex = *unused.choose(&mut *rng)?;
        used.insert(vertex);
        Some(vertex)
    };
    for &(first, second) in pairs {
        let Some(u) = pick(first, &mut used) else {
            continue;
        };
        if both_ends {
            let Some(v) = pick(second, &mut used) else {
                continue;
            };
            sample.insert((u as usize, v as usize));
        } else {
            sample.insert((u as usize, second));
        }
    }
    sample.into_iter().collect()
}

impl DistanceOracle {
    /// Draws up to `size` query pairs of the given `kind` inside common
    /// components.
    ///
    /// Edge pairs are ordered `(smaller, larger)`. With [`QueryKind::Both`]
    /// the first end is a vertex of the sampled hyperedge; with
    /// [`QueryKind::Vertex`] both ends are. The component structure of
    /// `graph` is recomputed when the oracle was built without one.
    #[instrument(name = "core.oracle.sample_pairs", skip(self, graph))]
    pub fn sample_query_pairs(
        &self,
        graph: &Hypergraph,
        size: usize,
        seed: u64,
        kind: QueryKind,
    ) -> Vec<(usize, usize)> {
        let discovered;
        let components = match &self.components {
            Some(components) => components,
            None => {
                discovered = ConnectedComponents::discover(graph, self.max_s());
                &discovered
            }
        };
        let mut rng = task_rng(seed, &[EDGE_PAIRS_SLOT]);
        let edge_pairs = sample_edge_pairs(components, size, &mut rng);
        debug!(pairs = edge_pairs.len(), "hyperedge pairs sampled");
        match kind {
            QueryKind::Edge => edge_pairs.into_iter().collect(),
            QueryKind::Both | QueryKind::Vertex => {
                let mut rng = task_rng(seed, &[VERTEX_PAIRS_SLOT]);
                to_vertex_pairs(graph, &edge_pairs, kind == QueryKind::Vertex, &mut rng)
            }
        }
    }
}
