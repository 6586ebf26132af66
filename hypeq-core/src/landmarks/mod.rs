//! Landmark budget allocation and selection across all overlap levels.
//!
//! Every component of every level becomes a slot with its size, threshold and
//! vertex count. Components with at most `lb` hyperedges are excluded: their
//! distances are approximated from the component size alone. The probability
//! policy grants landmark counts up front and then selects each component's
//! landmarks in parallel; the ranking policy grants one landmark at a time to
//! the best component of a median ranking and selects it immediately.

mod assignment;
mod paths;
mod selector;

use rand::{Rng, rngs::SmallRng};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    components::{ComponentId, ComponentLevel, ConnectedComponents},
    config::{LandmarkAssignment, OracleConfig},
    hypergraph::{EdgeId, Hypergraph},
    ranking::{BucketRanking, buckets_from_scores, median_ranking},
    rng::task_rng,
    search::EdgePath,
};

use self::assignment::{ComponentWeights, assign_landmarks, sample_sizes};

pub use self::selector::{IncrementalSelection, LandmarkSelector};

const ASSIGNMENT_SLOT: usize = 0;
const SELECTION_SLOT: usize = 1;
const RANKING_SLOT: usize = 2;
const PER_LEVEL_SLOT: usize = 3;
const BASELINE_SLOT: usize = 4;

/// One component of one level, flattened across levels.
#[derive(Clone, Copy, Debug)]
struct ComponentSlot {
    s: usize,
    id: ComponentId,
    weights: ComponentWeights,
}

fn level_slots(graph: &Hypergraph, level: &ComponentLevel, lb: usize) -> Vec<ComponentSlot> {
    level
        .components()
        .par_iter()
        .enumerate()
        .map(|(id, members)| {
            let weights = if members.len() > lb {
                ComponentWeights {
                    size: members.len(),
                    s: level.s(),
                    vertices: graph.count_vertices_in(members),
                }
            } else {
                ComponentWeights::default()
            };
            ComponentSlot {
                s: level.s(),
                id,
                weights,
            }
        })
        .collect()
}

fn members_of<'c>(components: &'c ConnectedComponents, slot: &ComponentSlot) -> &'c [EdgeId] {
    components
        .level(slot.s)
        .and_then(|level| level.component(slot.id))
        .unwrap_or(&[])
}

/// Number of candidates sampled for path search, spread over the components
/// with landmarks.
fn path_samples(
    config: &OracleConfig,
    weights: &[ComponentWeights],
    counts: &[usize],
    rng: &mut SmallRng,
) -> Vec<usize> {
    if !config.landmark_selection().uses_path_samples() {
        return vec![0; weights.len()];
    }
    let eligible: usize = weights.iter().map(|w| w.size).sum();
    let total = (eligible as f64 * config.sample_percentage()) as usize;
    sample_sizes(weights, counts, total, rng)
}

/// Landmarks for every level, indexed by `s - 1` and sorted.
#[instrument(
    name = "core.landmarks.select_all",
    skip(graph, components, config),
    fields(
        strategy = %config.landmark_selection(),
        policy = %config.landmark_assignment(),
    )
)]
pub(crate) fn select_all(
    graph: &Hypergraph,
    components: &ConnectedComponents,
    config: &OracleConfig,
    budget: u64,
) -> Vec<Vec<EdgeId>> {
    let slots: Vec<ComponentSlot> = components
        .levels()
        .iter()
        .flat_map(|level| level_slots(graph, level, config.lb()))
        .collect();
    debug!(slots = slots.len(), "component slots built");
    match config.landmark_assignment() {
        LandmarkAssignment::Probability => {
            select_by_probability(graph, components, &slots, config, budget)
        }
        LandmarkAssignment::Ranking => {
            select_by_ranking(graph, components, &slots, config, budget)
        }
    }
}

fn select_by_probability(
    graph: &Hypergraph,
    components: &ConnectedComponents,
    slots: &[ComponentSlot],
    config: &OracleConfig,
    budget: u64,
) -> Vec<Vec<EdgeId>> {
    let weights: Vec<ComponentWeights> = slots.iter().map(|slot| slot.weights).collect();
    let mut rng = task_rng(config.seed(), &[ASSIGNMENT_SLOT]);
    let counts = assign_landmarks(&weights, budget, config.alpha(), config.beta(), &mut rng);
    let samples = path_samples(config, &weights, &counts, &mut rng);

    let selector = LandmarkSelector::new(
        graph,
        config.landmark_selection(),
        config.sample_percentage(),
    );
    let picks: Vec<(usize, Vec<EdgeId>)> = slots
        .par_iter()
        .enumerate()
        .filter(|&(i, _)| counts[i] > 0)
        .map(|(i, slot)| {
            let mut rng = task_rng(config.seed(), &[SELECTION_SLOT, i]);
            let members = members_of(components, slot);
            let chosen = selector.select(members, counts[i], samples[i], slot.s, &mut rng);
            (slot.s, chosen)
        })
        .collect();
    group_by_level(components.max_s(), picks)
}

fn group_by_level(max_s: usize, picks: Vec<(usize, Vec<EdgeId>)>) -> Vec<Vec<EdgeId>> {
    let mut per_level: Vec<Vec<EdgeId>> = vec![Vec::new(); max_s];
    for (s, chosen) in picks {
        if let Some(level) = s.checked_sub(1).and_then(|slot| per_level.get_mut(slot)) {
            level.extend(chosen);
        }
    }
    for level in &mut per_level {
        level.sort_unstable();
        level.dedup();
    }
    per_level
}

/// The four component rankings driving the allocator, restricted to the
/// `active` slots: size, vertex count and threshold descending, landmarks
/// granted so far ascending.
fn component_rankings(
    slots: &[ComponentSlot],
    granted: &[usize],
    active: &[usize],
) -> [BucketRanking; 4] {
    let score = |f: fn(&ComponentSlot) -> usize| {
        active
            .iter()
            .map(move |&i| (i, u64::try_from(f(&slots[i])).unwrap_or(u64::MAX)))
    };
    [
        buckets_from_scores(score(|slot| slot.weights.size), true),
        buckets_from_scores(score(|slot| slot.weights.vertices), true),
        buckets_from_scores(score(|slot| slot.weights.s), true),
        buckets_from_scores(
            active
                .iter()
                .map(|&i| (i, u64::try_from(granted[i]).unwrap_or(u64::MAX))),
            false,
        ),
    ]
}

fn select_by_ranking(
    graph: &Hypergraph,
    components: &ConnectedComponents,
    slots: &[ComponentSlot],
    config: &OracleConfig,
    budget: u64,
) -> Vec<Vec<EdgeId>> {
    let selector = LandmarkSelector::new(
        graph,
        config.landmark_selection(),
        config.sample_percentage(),
    );
    let importance = [config.alpha(), config.alpha(), config.beta(), 1.0];
    let mut rng = task_rng(config.seed(), &[RANKING_SLOT]);
    let mut states: Vec<Option<IncrementalSelection>> = vec![None; slots.len()];
    let mut granted = vec![0_usize; slots.len()];
    let mut active: Vec<usize> = (0..slots.len())
        .filter(|&i| slots[i].weights.is_eligible())
        .collect();

    let mut estimate: u64 = 0;
    let mut median = median_ranking(&component_rankings(slots, &granted, &active), &importance);
    while estimate < budget {
        let Some(best) = median.first().filter(|bucket| !bucket.is_empty()) else {
            break;
        };
        let chosen = best[rng.gen_range(0..best.len())];
        let slot = &slots[chosen];
        let state = states[chosen].get_or_insert_with(|| {
            IncrementalSelection::new(members_of(components, slot).iter().copied())
        });
        if selector.select_next(state, slot.s, &mut rng).is_some() {
            granted[chosen] += 1;
            let size = u64::try_from(slot.weights.size).unwrap_or(u64::MAX);
            estimate = estimate.saturating_add(size);
        }
        if state.is_exhausted() {
            active.retain(|&i| i != chosen);
        }
        if active.is_empty() {
            break;
        }
        median = median_ranking(&component_rankings(slots, &granted, &active), &importance);
    }
    debug!(estimate, "ranking allocation finished");

    let picks: Vec<(usize, Vec<EdgeId>)> = states
        .into_iter()
        .zip(slots)
        .filter_map(|(state, slot)| state.map(|state| (slot.s, state.landmarks().to_vec())))
        .collect();
    group_by_level(components.max_s(), picks)
}

/// Landmarks for one level whose components were computed on their own,
/// spending `budget` with size and vertex count as the only weights.
pub(crate) fn select_for_level(
    graph: &Hypergraph,
    level: &ComponentLevel,
    config: &OracleConfig,
    alpha: f64,
    budget: u64,
) -> Vec<EdgeId> {
    let slots = level_slots(graph, level, config.lb());
    let weights: Vec<ComponentWeights> = slots
        .iter()
        .map(|slot| ComponentWeights {
            s: 0,
            ..slot.weights
        })
        .collect();
    let mut rng = task_rng(config.seed(), &[PER_LEVEL_SLOT, level.s()]);
    let counts = assign_landmarks(&weights, budget, alpha, 0.0, &mut rng);
    let samples = path_samples(config, &weights, &counts, &mut rng);
    let selector = LandmarkSelector::new(
        graph,
        config.landmark_selection(),
        config.sample_percentage(),
    );
    let mut chosen: Vec<EdgeId> = slots
        .par_iter()
        .enumerate()
        .filter(|&(i, _)| counts[i] > 0)
        .flat_map_iter(|(i, slot)| {
            let mut rng = task_rng(config.seed(), &[PER_LEVEL_SLOT, level.s(), i]);
            let members = level.component(slot.id).unwrap_or(&[]);
            selector.select(members, counts[i], samples[i], slot.s, &mut rng)
        })
        .collect();
    chosen.sort_unstable();
    chosen
}

/// Selector state for the global population that ignores components. Paths
/// sampled by the path-based strategies are kept per level across rounds.
#[derive(Debug)]
pub(crate) struct GlobalSelection<'a> {
    selector: LandmarkSelector<'a>,
    graph: &'a Hypergraph,
    sample_percentage: f64,
    seed: u64,
    round: usize,
    paths: Vec<Vec<EdgePath>>,
}

impl<'a> GlobalSelection<'a> {
    pub(crate) fn new(graph: &'a Hypergraph, config: &OracleConfig) -> Self {
        Self {
            selector: LandmarkSelector::new(
                graph,
                config.landmark_selection(),
                config.sample_percentage(),
            ),
            graph,
            sample_percentage: config.sample_percentage(),
            seed: config.seed(),
            round: 0,
            paths: vec![Vec::new(); config.max_s()],
        }
    }

    /// Up to `count` new landmarks at level `s` among the hyperedges with at
    /// least `s` vertices that are not in the sorted `existing`.
    pub(crate) fn select(&mut self, existing: &[EdgeId], count: usize, s: usize) -> Vec<EdgeId> {
        self.round += 1;
        let candidates: Vec<EdgeId> = self
            .graph
            .edges_with_min_size(s)
            .into_iter()
            .filter(|edge| existing.binary_search(edge).is_err())
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        let count = count.min(candidates.len());
        let sample_size = ((candidates.len() as f64 * self.sample_percentage) as usize).max(1);
        let mut rng = task_rng(self.seed, &[BASELINE_SLOT, s, self.round]);
        let mut scratch = Vec::new();
        let cached = s
            .checked_sub(1)
            .and_then(|slot| self.paths.get_mut(slot))
            .unwrap_or(&mut scratch);
        self.selector
            .select_with_paths(&candidates, count, sample_size, s, &mut rng, cached)
    }
}
