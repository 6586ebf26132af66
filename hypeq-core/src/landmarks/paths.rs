//! Shortest s-paths between random pairs of candidates.

use rand::{rngs::SmallRng, seq::index};
use rayon::prelude::*;

use crate::{
    hypergraph::{EdgeId, Hypergraph},
    search::EdgePath,
};

/// Pairs up `sample_size` distinct candidates drawn at random.
///
/// Consecutive draws form a pair; an odd draw count also pairs the first draw
/// with the last. Fewer than two candidates yield no pair.
pub(crate) fn sample_pairs(
    candidates: &[EdgeId],
    sample_size: usize,
    rng: &mut SmallRng,
) -> Vec<(EdgeId, EdgeId)> {
    let amount = sample_size.min(candidates.len());
    if candidates.len() < 2 || amount < 2 {
        return Vec::new();
    }
    let items: Vec<EdgeId> = if amount == candidates.len() {
        candidates.to_vec()
    } else {
        index::sample(rng, candidates.len(), amount)
            .into_iter()
            .map(|slot| candidates[slot])
            .collect()
    };
    let mut pairs: Vec<(EdgeId, EdgeId)> = items
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    if items.len() % 2 == 1 {
        if let (Some(&first), Some(&last)) = (items.first(), items.last()) {
            pairs.push((first, last));
        }
    }
    pairs
}

/// Shortest s-paths between sampled pairs of `candidates`.
///
/// With `all_paths` every shortest path of every pair is returned, otherwise
/// one per pair. Pairs that are not s-connected contribute nothing.
pub(crate) fn paths_in_sample(
    graph: &Hypergraph,
    candidates: &[EdgeId],
    sample_size: usize,
    s: usize,
    all_paths: bool,
    rng: &mut SmallRng,
) -> Vec<EdgePath> {
    let pairs = sample_pairs(candidates, sample_size, rng);
    let estimated_size = candidates.len();
    if all_paths {
        pairs
            .par_iter()
            .flat_map_iter(|&(a, b)| graph.find_all_paths_between(a, b, s, estimated_size))
            .filter(|path| !path.is_empty())
            .collect()
    } else {
        pairs
            .par_iter()
            .filter_map(|&(a, b)| graph.bidirectional_sp_search(a, b, s, estimated_size))
            .filter(|path| !path.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rng::task_rng, test_utils::chain_graph};
    use rstest::rstest;

    #[rstest]
    #[case::too_few_candidates(vec![3], 4, 0)]
    #[case::sample_of_one(vec![1, 2, 3], 1, 0)]
    #[case::even(vec![1, 2, 3, 4, 5, 6], 4, 2)]
    #[case::odd_closes_the_loop(vec![1, 2, 3, 4, 5, 6], 5, 3)]
    #[case::clamped(vec![1, 2, 3], 10, 2)]
    fn pair_counts(#[case] candidates: Vec<EdgeId>, #[case] size: usize, #[case] expected: usize) {
        let mut rng = task_rng(7, &[0]);
        let pairs = sample_pairs(&candidates, size, &mut rng);
        assert_eq!(pairs.len(), expected);
        for (a, b) in pairs {
            assert_ne!(a, b);
            assert!(candidates.contains(&a) && candidates.contains(&b));
        }
    }

    #[test]
    fn whole_candidate_set_is_paired_in_order() {
        let mut rng = task_rng(7, &[0]);
        assert_eq!(
            sample_pairs(&[4, 8, 9], 3, &mut rng),
            vec![(4, 8), (4, 9)]
        );
    }

    #[test]
    fn chain_paths_run_through_the_middle() {
        let mut graph = chain_graph();
        graph.compute_overlaps(3);
        let mut rng = task_rng(1, &[0]);
        let paths = paths_in_sample(&graph, &[0, 2], 2, 1, false, &mut rng);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].edges(), &[0, 1, 2]);
        let none = paths_in_sample(&graph, &[0, 2], 2, 2, true, &mut rng);
        assert!(none.is_empty());
    }
}
