//! Shared test utilities for `hypeq-core`.

use hypeq_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use test_strategy::Arbitrary;

use crate::hypergraph::{EdgeId, Hypergraph};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `HYPEQ_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Shape of a generated hypergraph.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(crate) enum HypergraphShape {
    /// Few vertices per edge over a wide vertex range.
    #[weight(2)]
    Sparse,
    /// Many vertices per edge over a narrow vertex range.
    #[weight(2)]
    Dense,
    /// Consecutive edges overlapping in a random number of vertices.
    #[weight(1)]
    Chain,
    /// Dense groups of edges linked through rare shared vertices.
    #[weight(2)]
    Clustered,
}

/// Generated hypergraph input plus how it was produced.
#[derive(Clone, Debug)]
pub(crate) struct HypergraphFixture {
    pub shape: HypergraphShape,
    pub edges: Vec<Vec<u32>>,
}

impl HypergraphFixture {
    pub(crate) fn graph(&self) -> Hypergraph {
        Hypergraph::from_edges(self.edges.clone()).expect("generated edges are non-empty")
    }
}

pub(crate) fn hypergraph_fixture_strategy() -> impl Strategy<Value = HypergraphFixture> {
    (any::<HypergraphShape>(), any::<u64>())
        .prop_map(|(shape, seed)| generate_fixture(shape, &mut SmallRng::seed_from_u64(seed)))
}

pub(crate) fn generate_fixture(shape: HypergraphShape, rng: &mut SmallRng) -> HypergraphFixture {
    let edges = match shape {
        HypergraphShape::Sparse => random_edges(rng, 2..20, 1..4, 40),
        HypergraphShape::Dense => random_edges(rng, 2..16, 2..7, 10),
        HypergraphShape::Chain => chain_edges(rng),
        HypergraphShape::Clustered => clustered_edges(rng),
    };
    HypergraphFixture { shape, edges }
}

fn random_edges(
    rng: &mut SmallRng,
    count: std::ops::Range<usize>,
    size: std::ops::Range<usize>,
    universe: u32,
) -> Vec<Vec<u32>> {
    let n = rng.gen_range(count);
    (0..n)
        .map(|_| {
            let k = rng.gen_range(size.clone());
            (0..k).map(|_| rng.gen_range(0..universe)).collect()
        })
        .collect()
}

fn chain_edges(rng: &mut SmallRng) -> Vec<Vec<u32>> {
    let n = rng.gen_range(2..12);
    let mut next: u32 = 0;
    let mut previous: Vec<u32> = Vec::new();
    let mut edges = Vec::with_capacity(n);
    for _ in 0..n {
        let keep = rng.gen_range(0..=previous.len().min(3));
        let fresh = rng.gen_range(1..4);
        let mut edge: Vec<u32> = previous.iter().rev().take(keep).copied().collect();
        for _ in 0..fresh {
            edge.push(next);
            next += 1;
        }
        previous.clone_from(&edge);
        edges.push(edge);
    }
    edges
}

fn clustered_edges(rng: &mut SmallRng) -> Vec<Vec<u32>> {
    let clusters = rng.gen_range(1..4_u32);
    let mut edges = Vec::new();
    for cluster in 0..clusters {
        let base = cluster * 100;
        for _ in 0..rng.gen_range(2..7) {
            let k = rng.gen_range(2..6);
            let mut edge: Vec<u32> = (0..k).map(|_| base + rng.gen_range(0..8)).collect();
            if rng.gen_bool(0.15) {
                edge.push(rng.gen_range(0..clusters) * 100);
            }
            edges.push(edge);
        }
    }
    edges
}

/// The three-edge chain `{1,2,3}`, `{3,4,5}`, `{5,6,7}`.
pub(crate) fn chain_graph() -> Hypergraph {
    Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])
        .expect("chain edges are non-empty")
}

/// Exact s-components by brute force: pairwise intersections over the
/// hyperedges with at least `s` vertices, ordered like the engine output.
pub(crate) fn brute_force_components(graph: &Hypergraph, s: usize) -> Vec<Vec<EdgeId>> {
    let view = graph.edges_with_min_size(s);
    let mut label: Vec<usize> = (0..view.len()).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..view.len() {
            for j in 0..view.len() {
                let shared = crate::hypergraph::capped_intersection_size(
                    graph.vertices_of(view[i]),
                    graph.vertices_of(view[j]),
                    usize::MAX,
                );
                if shared >= s && label[j] < label[i] {
                    label[i] = label[j];
                    changed = true;
                }
            }
        }
    }
    let mut groups: Vec<Vec<EdgeId>> = Vec::new();
    let mut slot_of: Vec<Option<usize>> = vec![None; view.len()];
    for (i, &edge) in view.iter().enumerate() {
        match slot_of[label[i]] {
            Some(slot) => groups[slot].push(edge),
            None => {
                slot_of[label[i]] = Some(groups.len());
                groups.push(vec![edge]);
            }
        }
    }
    groups
}
