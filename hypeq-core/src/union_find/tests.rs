//! Tests for the disjoint-set forest.

use proptest::prelude::*;
use rstest::rstest;

use crate::test_utils::suite_proptest_config;

use super::DisjointSet;

/// Transitive closure over `n` nodes by repeated relaxation.
fn closure(n: usize, pairs: &[(usize, usize)]) -> Vec<Vec<bool>> {
    let mut reach = vec![vec![false; n]; n];
    for (i, row) in reach.iter_mut().enumerate() {
        row[i] = true;
    }
    for &(a, b) in pairs {
        reach[a][b] = true;
        reach[b][a] = true;
    }
    for k in 0..n {
        for i in 0..n {
            if reach[i][k] {
                for j in 0..n {
                    if reach[k][j] {
                        reach[i][j] = true;
                    }
                }
            }
        }
    }
    reach
}

fn union_sequence() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1_usize..24).prop_flat_map(|n| {
        let pairs = prop::collection::vec((0..n, 0..n), 0..48);
        (Just(n), pairs)
    })
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn find_matches_brute_force_closure((n, pairs) in union_sequence()) {
        let mut forest = DisjointSet::new(n);
        for &(a, b) in &pairs {
            forest.union(a, b);
        }
        let reach = closure(n, &pairs);
        for i in 0..n {
            for j in 0..n {
                prop_assert_eq!(forest.same_component(i, j), reach[i][j]);
            }
        }
    }

    #[test]
    fn count_drops_once_per_merging_union((n, pairs) in union_sequence()) {
        let mut forest = DisjointSet::new(n);
        for &(a, b) in &pairs {
            let before = forest.count();
            let distinct = !forest.same_component(a, b);
            let merged = forest.union(a, b);
            prop_assert_eq!(merged, distinct);
            let expected = if distinct { before - 1 } else { before };
            prop_assert_eq!(forest.count(), expected);
        }
        prop_assert_eq!(forest.count(), forest.groups().len());
    }
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn seeded_group_is_connected(n in 2_usize..16, cut in 1_usize..16) {
        let members: Vec<usize> = (0..n.min(cut)).collect();
        let mut forest = DisjointSet::new(n);
        forest.initialize_from_component(&members);
        for &member in &members {
            prop_assert!(forest.same_component(members[0], member));
        }
        prop_assert_eq!(forest.count(), n - members.len() + 1);
    }
}

#[rstest]
#[case::empty(&[], 5)]
#[case::singleton(&[3], 5)]
#[case::pair(&[1, 4], 4)]
#[case::all(&[0, 1, 2, 3, 4], 1)]
fn initialize_updates_count(#[case] members: &[usize], #[case] expected: usize) {
    let mut forest = DisjointSet::new(5);
    forest.initialize_from_component(members);
    assert_eq!(forest.count(), expected);
}

#[test]
fn seeded_forest_keeps_merging() {
    let mut forest = DisjointSet::new(6);
    forest.initialize_from_component(&[0, 2, 4]);
    assert!(forest.union(1, 4));
    assert!(forest.same_component(0, 1));
    assert!(!forest.same_component(0, 3));
    assert_eq!(forest.groups(), vec![vec![0, 1, 2, 4], vec![3], vec![5]]);
}

#[test]
fn groups_are_ordered_by_smallest_member() {
    let mut forest = DisjointSet::new(5);
    forest.union(4, 1);
    forest.union(3, 0);
    assert_eq!(forest.groups(), vec![vec![0, 3], vec![1, 4], vec![2]]);
}
