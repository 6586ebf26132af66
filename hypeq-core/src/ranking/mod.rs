//! Median (Kemeny-style) aggregation of bucket rankings.
//!
//! A bucket ranking orders elements best first and groups ties into the same
//! bucket. [`median_ranking`] searches for the bucket ranking minimising the
//! weighted generalised Kendall-tau distance to every input ranking: each
//! pair of elements costs the weight of every input that orders it
//! differently, ties included.
//!
//! The search is the BioConsert local search. Every distinct input ranking
//! is used as a starting point; single elements are moved into another
//! bucket or into a new bucket of their own while that strictly lowers the
//! distance. Visited rankings are shared across starting points so that a
//! trajectory joining an explored one stops early. The best ranking found is
//! returned, which is a heuristic answer to an NP-hard problem.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::instrument;

/// Elements grouped into tied buckets, best bucket first.
pub type BucketRanking = Vec<Vec<usize>>;

const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Groups `(element, score)` pairs into a bucket ranking.
///
/// With `higher_first`, the largest score forms the first bucket; otherwise
/// the smallest does. Members of a bucket ascend.
///
/// # Examples
/// ```
/// use hypeq_core::buckets_from_scores;
///
/// let scores = [(0, 5), (1, 9), (2, 5), (3, 1)];
/// assert_eq!(
///     buckets_from_scores(scores, true),
///     vec![vec![1], vec![0, 2], vec![3]]
/// );
/// assert_eq!(
///     buckets_from_scores(scores, false),
///     vec![vec![3], vec![0, 2], vec![1]]
/// );
/// ```
#[must_use]
pub fn buckets_from_scores<I>(scores: I, higher_first: bool) -> BucketRanking
where
    I: IntoIterator<Item = (usize, u64)>,
{
    let mut grouped: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (element, score) in scores {
        grouped.entry(score).or_default().push(element);
    }
    let mut buckets: BucketRanking = grouped
        .into_values()
        .map(|mut bucket| {
            bucket.sort_unstable();
            bucket.dedup();
            bucket
        })
        .collect();
    if higher_first {
        buckets.reverse();
    }
    buckets
}

/// Aggregates `rankings` into a single median bucket ranking.
///
/// The elements of the first ranking form the universe; elements of later
/// rankings outside it are ignored, and universe elements a later ranking
/// omits are placed in an extra last bucket of that ranking. `weights[i]`
/// scales the disagreements with `rankings[i]` and defaults to one when
/// missing.
///
/// # Examples
/// ```
/// use hypeq_core::median_ranking;
///
/// let rankings = vec![
///     vec![vec![0], vec![1], vec![2]],
///     vec![vec![0], vec![2], vec![1]],
///     vec![vec![0], vec![1], vec![2]],
/// ];
/// let median = median_ranking(&rankings, &[1.0, 1.0, 1.0]);
/// assert_eq!(median, vec![vec![0], vec![1], vec![2]]);
/// ```
#[must_use]
#[instrument(
    name = "core.landmarks.rank",
    skip(rankings, weights),
    fields(rankings = rankings.len())
)]
pub fn median_ranking(rankings: &[BucketRanking], weights: &[f64]) -> BucketRanking {
    let Some(first) = rankings.first() else {
        return Vec::new();
    };
    let mut universe: Vec<usize> = first.iter().flatten().copied().collect();
    universe.sort_unstable();
    universe.dedup();
    match universe.len() {
        0 => return Vec::new(),
        1 => return vec![universe],
        _ => {}
    }

    let departures = departure_positions(rankings, &universe);
    let weights: Vec<f64> = (0..departures.len())
        .map(|i| weights.get(i).copied().unwrap_or(1.0))
        .collect();
    let costs = PairCosts {
        departures: &departures,
        weights: &weights,
    };

    let mut visited: HashSet<Vec<usize>> = HashSet::new();
    let mut best: Option<(f64, Vec<usize>)> = None;
    for start in &departures {
        if !visited.insert(start.clone()) {
            continue;
        }
        let (distance, refined) = costs.local_search(start.clone(), &mut visited);
        if best.as_ref().is_none_or(|(d, _)| distance < *d) {
            best = Some((distance, refined));
        }
    }
    best.map_or_else(Vec::new, |(_, positions)| {
        into_buckets(&positions, &universe)
    })
}

/// Position of every universe element in every ranking, normalised to
/// consecutive bucket indices.
fn departure_positions(rankings: &[BucketRanking], universe: &[usize]) -> Vec<Vec<usize>> {
    let slot_of: HashMap<usize, usize> = universe
        .iter()
        .enumerate()
        .map(|(slot, &element)| (element, slot))
        .collect();
    rankings
        .iter()
        .map(|ranking| {
            let mut positions = vec![ranking.len(); universe.len()];
            for (bucket, members) in ranking.iter().enumerate() {
                for element in members {
                    if let Some(&slot) = slot_of.get(element) {
                        positions[slot] = bucket;
                    }
                }
            }
            normalise(&mut positions);
            positions
        })
        .collect()
}

/// Renumbers bucket indices to `0..k` preserving their order.
fn normalise(positions: &mut [usize]) {
    let mut used: Vec<usize> = positions.to_vec();
    used.sort_unstable();
    used.dedup();
    for position in positions.iter_mut() {
        *position = used.partition_point(|&p| p < *position);
    }
}

fn into_buckets(positions: &[usize], universe: &[usize]) -> BucketRanking {
    let count = positions.iter().max().map_or(0, |&m| m + 1);
    let mut buckets: BucketRanking = vec![Vec::new(); count];
    for (slot, &position) in positions.iter().enumerate() {
        buckets[position].push(universe[slot]);
    }
    buckets.retain(|bucket| !bucket.is_empty());
    buckets
}

/// Relation of element `x` to element `y` in a candidate ranking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Relation {
    Before,
    After,
    Tied,
}

struct PairCosts<'a> {
    departures: &'a [Vec<usize>],
    weights: &'a [f64],
}

impl PairCosts<'_> {
    /// Weighted number of input rankings disagreeing with placing `x` in
    /// `relation` to `y`.
    fn cost(&self, x: usize, y: usize, relation: Relation) -> f64 {
        self.departures
            .iter()
            .zip(self.weights)
            .filter(|(ranking, _)| {
                let observed = match ranking[x].cmp(&ranking[y]) {
                    std::cmp::Ordering::Less => Relation::Before,
                    std::cmp::Ordering::Greater => Relation::After,
                    std::cmp::Ordering::Equal => Relation::Tied,
                };
                observed != relation
            })
            .map(|(_, &weight)| weight)
            .sum()
    }

    fn distance(&self, positions: &[usize]) -> f64 {
        let mut total = 0.0;
        for x in 0..positions.len() {
            for y in x + 1..positions.len() {
                let relation = match positions[x].cmp(&positions[y]) {
                    std::cmp::Ordering::Less => Relation::Before,
                    std::cmp::Ordering::Greater => Relation::After,
                    std::cmp::Ordering::Equal => Relation::Tied,
                };
                total += self.cost(x, y, relation);
            }
        }
        total
    }

    /// Moves single elements while a move strictly lowers the distance.
    fn local_search(
        &self,
        mut positions: Vec<usize>,
        visited: &mut HashSet<Vec<usize>>,
    ) -> (f64, Vec<usize>) {
        let mut distance = self.distance(&positions);
        let mut improved = true;
        while improved {
            improved = false;
            for element in 0..positions.len() {
                let Some((gain, placement)) = self.best_move(&positions, element) else {
                    continue;
                };
                apply(&mut positions, element, placement);
                distance -= gain;
                improved = true;
                if !visited.insert(positions.clone()) {
                    return (distance, positions);
                }
            }
        }
        (distance, positions)
    }

    /// Cheapest placement of `element`, if it beats the current one.
    fn best_move(&self, positions: &[usize], element: usize) -> Option<(f64, Placement)> {
        let buckets = positions.iter().max().map_or(0, |&m| m + 1);
        let mut before = vec![0.0; buckets];
        let mut after = vec![0.0; buckets];
        let mut tied = vec![0.0; buckets];
        for (other, &bucket) in positions.iter().enumerate() {
            if other == element {
                continue;
            }
            before[bucket] += self.cost(element, other, Relation::Before);
            after[bucket] += self.cost(element, other, Relation::After);
            tied[bucket] += self.cost(element, other, Relation::Tied);
        }

        // prefix_after[k]: element placed after every bucket below k.
        // suffix_before[k]: element placed before every bucket from k on.
        let mut prefix_after = vec![0.0; buckets + 1];
        for k in 0..buckets {
            prefix_after[k + 1] = prefix_after[k] + after[k];
        }
        let mut suffix_before = vec![0.0; buckets + 1];
        for k in (0..buckets).rev() {
            suffix_before[k] = suffix_before[k + 1] + before[k];
        }

        let join = |k: usize| prefix_after[k] + tied[k] + suffix_before[k + 1];
        let split = |gap: usize| prefix_after[gap] + suffix_before[gap];
        let current = join(positions[element]);

        let mut best: Option<(f64, Placement)> = None;
        let mut consider = |cost: f64, placement: Placement| {
            let gain = current - cost;
            if gain > IMPROVEMENT_EPSILON && best.as_ref().is_none_or(|(g, _)| gain > *g) {
                best = Some((gain, placement));
            }
        };
        for k in 0..buckets {
            if k != positions[element] {
                consider(join(k), Placement::Join(k));
            }
        }
        for gap in 0..=buckets {
            consider(split(gap), Placement::Split(gap));
        }
        best
    }
}

/// Where a moved element lands, in bucket indices of the ranking before the
/// move.
#[derive(Clone, Copy, Debug)]
enum Placement {
    /// Into the existing bucket.
    Join(usize),
    /// Into a new bucket inserted before the bucket at this index.
    Split(usize),
}

fn apply(positions: &mut [usize], element: usize, placement: Placement) {
    match placement {
        Placement::Join(bucket) => positions[element] = bucket,
        Placement::Split(gap) => {
            for position in positions.iter_mut() {
                *position = 2 * *position + 1;
            }
            positions[element] = 2 * gap;
        }
    }
    normalise(positions);
}
