//! Landmark selection strategies.
//!
//! [`LandmarkSelector::select`] picks a fixed number of landmarks among the
//! candidates of one component at once. [`LandmarkSelector::select_next`]
//! picks one more landmark given an [`IncrementalSelection`], which the
//! ranking allocator interleaves with its budget updates.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
};

use rand::{Rng, rngs::SmallRng, seq::SliceRandom};

use super::paths::paths_in_sample;
use crate::{
    config::LandmarkSelection,
    hypergraph::{EdgeId, Hypergraph},
    search::EdgePath,
};

/// Applies one [`LandmarkSelection`] strategy over a hypergraph whose
/// overlap index is installed.
///
/// # Examples
/// ```
/// use hypeq_core::{Hypergraph, LandmarkSelection, LandmarkSelector};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(2);
/// let selector = LandmarkSelector::new(&graph, LandmarkSelection::Degree, 0.4);
/// let mut rng = SmallRng::seed_from_u64(4);
/// assert_eq!(selector.select(&[0, 1, 2], 1, 0, 1, &mut rng), vec![1]);
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LandmarkSelector<'a> {
    graph: &'a Hypergraph,
    strategy: LandmarkSelection,
    sample_percentage: f64,
}

impl<'a> LandmarkSelector<'a> {
    /// Creates a selector; `sample_percentage` sizes the path samples of the
    /// incremental path-based strategies.
    #[must_use]
    pub const fn new(
        graph: &'a Hypergraph,
        strategy: LandmarkSelection,
        sample_percentage: f64,
    ) -> Self {
        Self {
            graph,
            strategy,
            sample_percentage,
        }
    }

    /// Strategy applied by this selector.
    #[must_use]
    #[rustfmt::skip]
    pub const fn strategy(&self) -> LandmarkSelection { self.strategy }

    /// Picks `count` landmarks among `candidates` at threshold `s`, sorted.
    ///
    /// `sample_size` is the number of candidates paired up for path sampling
    /// by the best-cover and betweenness strategies. Asking for at least as
    /// many landmarks as there are candidates returns every candidate.
    #[must_use]
    pub fn select(
        &self,
        candidates: &[EdgeId],
        count: usize,
        sample_size: usize,
        s: usize,
        rng: &mut SmallRng,
    ) -> Vec<EdgeId> {
        let mut cached = Vec::new();
        self.select_with_paths(candidates, count, sample_size, s, rng, &mut cached)
    }

    /// As [`Self::select`], reusing previously sampled paths from `cached`
    /// when it is not empty. Best cover leaves the paths it did not cover in
    /// `cached`; betweenness leaves every sampled path.
    pub(crate) fn select_with_paths(
        &self,
        candidates: &[EdgeId],
        count: usize,
        sample_size: usize,
        s: usize,
        rng: &mut SmallRng,
        cached: &mut Vec<EdgePath>,
    ) -> Vec<EdgeId> {
        if count == 0 || candidates.is_empty() {
            return Vec::new();
        }
        if count >= candidates.len() {
            return sorted(candidates.to_vec());
        }
        let picked = match self.strategy {
            LandmarkSelection::Random => random_selection(candidates, count, rng),
            LandmarkSelection::Degree => self.degree_selection(candidates, count, s),
            LandmarkSelection::Farthest => self.farthest_selection(candidates, count, s, rng),
            LandmarkSelection::BestCover => {
                if cached.is_empty() {
                    *cached = paths_in_sample(self.graph, candidates, sample_size, s, false, rng);
                }
                let picked = best_cover_picks(cached, candidates, count);
                cached.retain(|path| !picked.iter().any(|&l| path.contains(l)));
                self.pad_with_degree(picked, candidates, count, s)
            }
            LandmarkSelection::Betweenness => {
                if cached.is_empty() {
                    *cached = paths_in_sample(self.graph, candidates, sample_size, s, true, rng);
                }
                let picked = betweenness_picks(cached, candidates, count);
                self.pad_with_degree(picked, candidates, count, s)
            }
        };
        sorted(picked)
    }

    /// Picks one more landmark for `state` at threshold `s`. Returns `None`
    /// once no candidate remains.
    pub fn select_next(
        &self,
        state: &mut IncrementalSelection,
        s: usize,
        rng: &mut SmallRng,
    ) -> Option<EdgeId> {
        if state.candidates.is_empty() {
            return None;
        }
        let picked = match self.strategy {
            LandmarkSelection::Random => {
                let slot = rng.gen_range(0..state.candidates.len());
                state.candidates.iter().nth(slot).copied()
            }
            LandmarkSelection::Degree => self.highest_degree(&state.candidates, s),
            LandmarkSelection::Farthest => self.farthest_from(state, s, rng),
            LandmarkSelection::BestCover | LandmarkSelection::Betweenness => {
                self.most_covering(state, s, rng)
            }
        }?;
        state.candidates.remove(&picked);
        state.landmarks.push(picked);
        Some(picked)
    }

    fn degree_selection(&self, candidates: &[EdgeId], count: usize, s: usize) -> Vec<EdgeId> {
        let mut ranked: Vec<(Reverse<usize>, EdgeId)> = candidates
            .iter()
            .map(|&edge| (Reverse(self.graph.s_degree(edge, s)), edge))
            .collect();
        ranked.sort_unstable();
        ranked.into_iter().take(count).map(|(_, edge)| edge).collect()
    }

    fn pad_with_degree(
        &self,
        mut picked: Vec<EdgeId>,
        candidates: &[EdgeId],
        count: usize,
        s: usize,
    ) -> Vec<EdgeId> {
        let missing = count.saturating_sub(picked.len());
        if missing == 0 {
            return picked;
        }
        let taken: HashSet<EdgeId> = picked.iter().copied().collect();
        let rest: Vec<EdgeId> = candidates
            .iter()
            .copied()
            .filter(|edge| !taken.contains(edge))
            .collect();
        picked.extend(self.degree_selection(&rest, missing, s));
        picked
    }

    /// Farthest-first traversal. Candidates with no s-neighbour count as
    /// reached from the start and are only picked as farthest points.
    fn farthest_selection(
        &self,
        candidates: &[EdgeId],
        count: usize,
        s: usize,
        rng: &mut SmallRng,
    ) -> Vec<EdgeId> {
        let mut order = candidates.to_vec();
        order.shuffle(rng);
        let slot_of: HashMap<EdgeId, usize> = order
            .iter()
            .enumerate()
            .map(|(slot, &edge)| (edge, slot))
            .collect();
        let mut selectable = vec![false; order.len()];
        let mut reached: BTreeSet<EdgeId> = BTreeSet::new();
        for (slot, &edge) in order.iter().enumerate() {
            if self.graph.s_degree(edge, s) > 0 {
                selectable[slot] = true;
            } else {
                reached.insert(edge);
            }
        }
        let Some(first) = selectable.iter().position(|&flag| flag) else {
            return random_selection(candidates, count, rng);
        };

        let mut landmarks = vec![order[first]];
        let mut chosen: HashSet<EdgeId> = HashSet::from([order[first]]);
        selectable[first] = false;
        let mut distances: Vec<HashMap<EdgeId, u32>> = Vec::new();
        let mut newest = order[first];
        let total = order.len() as f64;

        while landmarks.len() < count {
            let from_newest: HashMap<EdgeId, u32> =
                self.graph.distances_from(newest, s).into_iter().collect();
            for &edge in from_newest.keys() {
                reached.insert(edge);
                if let Some(&slot) = slot_of.get(&edge) {
                    selectable[slot] = false;
                }
            }
            distances.push(from_newest);

            let unreached_share = 1.0 - reached.len() as f64 / total;
            let first_selectable = selectable.iter().position(|&flag| flag);
            let jump = reached.len() < order.len() && rng.r#gen::<f64>() < unreached_share;
            let next = match first_selectable {
                Some(slot) if jump => Some(order[slot]),
                _ => farthest_reached(&reached, &slot_of, &chosen, &distances)
                    .or_else(|| first_selectable.map(|slot| order[slot])),
            };
            let Some(next) = next else {
                break;
            };
            if let Some(&slot) = slot_of.get(&next) {
                selectable[slot] = false;
            }
            chosen.insert(next);
            landmarks.push(next);
            newest = next;
        }

        if landmarks.len() < count {
            let rest: Vec<EdgeId> = order
                .iter()
                .copied()
                .filter(|edge| !chosen.contains(edge))
                .collect();
            landmarks.extend(random_selection(&rest, count - landmarks.len(), rng));
        }
        landmarks
    }

    fn highest_degree(&self, candidates: &BTreeSet<EdgeId>, s: usize) -> Option<EdgeId> {
        candidates
            .iter()
            .copied()
            .min_by_key(|&edge| (Reverse(self.graph.s_degree(edge, s)), edge))
    }

    /// The candidate maximising its distance to the closest current landmark.
    fn farthest_from(
        &self,
        state: &IncrementalSelection,
        s: usize,
        rng: &mut SmallRng,
    ) -> Option<EdgeId> {
        if state.landmarks.is_empty() {
            let slot = rng.gen_range(0..state.candidates.len());
            return state.candidates.iter().nth(slot).copied();
        }
        let mut closest: HashMap<EdgeId, u32> = HashMap::new();
        for &landmark in &state.landmarks {
            for (edge, distance) in self.graph.distances_from(landmark, s) {
                if state.candidates.contains(&edge) {
                    closest
                        .entry(edge)
                        .and_modify(|d| *d = (*d).min(distance))
                        .or_insert(distance);
                }
            }
        }
        let mut best: Option<(u32, EdgeId)> = None;
        for &candidate in &state.candidates {
            let distance = closest.get(&candidate).copied().unwrap_or(u32::MAX);
            if distance > 0 && best.is_none_or(|(d, _)| distance > d) {
                best = Some((distance, candidate));
            }
        }
        best.map(|(_, edge)| edge)
            .or_else(|| state.candidates.first().copied())
    }

    /// The candidate lying on the most sampled paths. Best cover then drops
    /// every path through the pick; betweenness keeps them.
    fn most_covering(
        &self,
        state: &mut IncrementalSelection,
        s: usize,
        rng: &mut SmallRng,
    ) -> Option<EdgeId> {
        if state.candidates.len() == 1 {
            return state.candidates.first().copied();
        }
        let cover = self.strategy == LandmarkSelection::BestCover;
        let needs_sample = if cover {
            state.paths.values().all(BTreeSet::is_empty)
        } else {
            state.paths.is_empty()
        };
        if needs_sample {
            self.sample_paths_for(state, s, !cover, rng);
        }

        let best = state
            .candidates
            .iter()
            .filter_map(|&edge| state.paths.get(&edge).map(|ids| (ids.len(), edge)))
            .filter(|&(len, _)| len > 0)
            .min_by_key(|&(len, edge)| (Reverse(len), edge))
            .map(|(_, edge)| edge);
        let Some(picked) = best else {
            return self.highest_degree(&state.candidates, s);
        };
        if let Some(covered) = state.paths.remove(&picked) {
            if cover {
                for ids in state.paths.values_mut() {
                    ids.retain(|id| !covered.contains(id));
                }
            }
        }
        Some(picked)
    }

    fn sample_paths_for(
        &self,
        state: &mut IncrementalSelection,
        s: usize,
        all_paths: bool,
        rng: &mut SmallRng,
    ) {
        let candidates: Vec<EdgeId> = state.candidates.iter().copied().collect();
        let sample_size = ((self.sample_percentage * candidates.len() as f64).ceil() as usize).max(2);
        let paths = paths_in_sample(self.graph, &candidates, sample_size, s, all_paths, rng);
        state.paths.clear();
        for (id, path) in paths.iter().enumerate() {
            for &edge in path.edges() {
                state.paths.entry(edge).or_default().insert(id);
            }
        }
    }
}

/// Landmarks picked so far in one component and the candidates left.
///
/// # Examples
/// ```
/// use hypeq_core::{Hypergraph, IncrementalSelection, LandmarkSelection, LandmarkSelector};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(2);
/// let selector = LandmarkSelector::new(&graph, LandmarkSelection::Degree, 0.4);
/// let mut state = IncrementalSelection::new([0, 1, 2]);
/// let mut rng = SmallRng::seed_from_u64(4);
/// assert_eq!(selector.select_next(&mut state, 1, &mut rng), Some(1));
/// assert_eq!(state.landmarks(), &[1]);
/// assert_eq!(state.remaining(), 2);
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct IncrementalSelection {
    candidates: BTreeSet<EdgeId>,
    landmarks: Vec<EdgeId>,
    paths: BTreeMap<EdgeId, BTreeSet<usize>>,
}

impl IncrementalSelection {
    /// Starts with every member of `candidates` unpicked.
    #[must_use]
    pub fn new<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = EdgeId>,
    {
        Self {
            candidates: candidates.into_iter().collect(),
            landmarks: Vec::new(),
            paths: BTreeMap::new(),
        }
    }

    /// Landmarks in the order they were picked.
    #[must_use]
    #[rustfmt::skip]
    pub fn landmarks(&self) -> &[EdgeId] { &self.landmarks }

    /// Number of candidates not yet picked.
    #[must_use]
    #[rustfmt::skip]
    pub fn remaining(&self) -> usize { self.candidates.len() }

    /// Whether every candidate has been picked.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_exhausted(&self) -> bool { self.candidates.is_empty() }
}

fn sorted(mut edges: Vec<EdgeId>) -> Vec<EdgeId> {
    edges.sort_unstable();
    edges.dedup();
    edges
}

fn random_selection(candidates: &[EdgeId], count: usize, rng: &mut SmallRng) -> Vec<EdgeId> {
    candidates.choose_multiple(rng, count).copied().collect()
}

/// Reached non-landmark candidate maximising the distance to its closest
/// landmark; candidates no landmark reaches count as infinitely far.
fn farthest_reached(
    reached: &BTreeSet<EdgeId>,
    slot_of: &HashMap<EdgeId, usize>,
    chosen: &HashSet<EdgeId>,
    distances: &[HashMap<EdgeId, u32>],
) -> Option<EdgeId> {
    let mut best: Option<(u32, EdgeId)> = None;
    for &edge in reached {
        if chosen.contains(&edge) || !slot_of.contains_key(&edge) {
            continue;
        }
        let closest = distances
            .iter()
            .map(|from| from.get(&edge).copied().unwrap_or(u32::MAX))
            .min()
            .unwrap_or(u32::MAX);
        if best.is_none_or(|(d, _)| closest > d) {
            best = Some((closest, edge));
        }
    }
    best.map(|(_, edge)| edge)
}

/// Greedy cover of `paths`: repeatedly picks the candidate lying on the most
/// uncovered paths, in pick order. Stops once every path is covered or
/// `count` candidates are picked.
pub(crate) fn best_cover_picks(
    paths: &[EdgePath],
    candidates: &[EdgeId],
    count: usize,
) -> Vec<EdgeId> {
    let allowed: HashSet<EdgeId> = candidates.iter().copied().collect();
    let mut counts: BTreeMap<EdgeId, usize> = BTreeMap::new();
    for path in paths {
        for edge in path.edges().iter().filter(|e| allowed.contains(*e)) {
            *counts.entry(*edge).or_insert(0) += 1;
        }
    }
    let mut covered = vec![false; paths.len()];
    let mut picked = Vec::new();
    while picked.len() < count && covered.iter().any(|c| !c) {
        let Some((&next, _)) = counts
            .iter()
            .filter(|&(_, &n)| n > 0)
            .min_by_key(|&(&edge, &n)| (Reverse(n), edge))
        else {
            break;
        };
        counts.remove(&next);
        picked.push(next);
        for (path, done) in paths.iter().zip(covered.iter_mut()) {
            if *done || !path.contains(next) {
                continue;
            }
            *done = true;
            for edge in path.edges() {
                if let Some(n) = counts.get_mut(edge) {
                    *n = n.saturating_sub(1);
                }
            }
        }
    }
    picked
}

/// The `count` candidates lying on the most paths.
pub(crate) fn betweenness_picks(
    paths: &[EdgePath],
    candidates: &[EdgeId],
    count: usize,
) -> Vec<EdgeId> {
    let allowed: HashSet<EdgeId> = candidates.iter().copied().collect();
    let mut counts: HashMap<EdgeId, usize> = HashMap::new();
    for path in paths {
        for edge in path.edges().iter().filter(|e| allowed.contains(*e)) {
            *counts.entry(*edge).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(Reverse<usize>, EdgeId)> =
        counts.into_iter().map(|(edge, n)| (Reverse(n), edge)).collect();
    ranked.sort_unstable();
    ranked.into_iter().take(count).map(|(_, edge)| edge).collect()
}
