//! Landmark labels for a single overlap threshold.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::hypergraph::{EdgeId, Hypergraph};

/// Landmarks of one overlap threshold and the exact s-distances from every
/// reachable hyperedge to them.
///
/// Labels are stored per hyperedge as `(landmark, distance)` pairs sorted by
/// landmark, so two labels are joined with a single merge pass.
///
/// # Examples
/// ```
/// use hypeq_core::{Hypergraph, SDistanceOracle};
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// graph.compute_overlaps(2);
/// let oracle = SDistanceOracle::from_landmarks(&graph, 1, &[1]);
/// assert_eq!(oracle.label(0), &[(1, 1)]);
/// assert_eq!(oracle.bounds_between(0, 2), Some((0, 2)));
/// assert_eq!(oracle.oracle_size(), 3);
/// # Ok::<(), hypeq_core::HypergraphError>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SDistanceOracle {
    s: usize,
    landmarks: Vec<EdgeId>,
    labels: Vec<Vec<(EdgeId, u32)>>,
}

impl SDistanceOracle {
    /// An oracle for threshold `s` with no landmark.
    #[must_use]
    pub fn empty(graph: &Hypergraph, s: usize) -> Self {
        Self {
            s,
            landmarks: Vec::new(),
            labels: vec![Vec::new(); graph.num_edges()],
        }
    }

    /// An oracle for threshold `s` labelled from `landmarks`.
    #[must_use]
    pub fn from_landmarks(graph: &Hypergraph, s: usize, landmarks: &[EdgeId]) -> Self {
        let mut oracle = Self::empty(graph, s);
        oracle.populate(graph, landmarks);
        oracle
    }

    /// Adds `landmarks` and labels every hyperedge they reach. Landmarks
    /// already present or unknown to `graph` are ignored.
    pub(crate) fn populate(&mut self, graph: &Hypergraph, landmarks: &[EdgeId]) {
        let mut fresh: Vec<EdgeId> = landmarks
            .iter()
            .copied()
            .filter(|&landmark| landmark < graph.num_edges())
            .filter(|landmark| self.landmarks.binary_search(landmark).is_err())
            .collect();
        fresh.sort_unstable();
        fresh.dedup();
        if fresh.is_empty() {
            return;
        }

        let s = self.s;
        let reached: Vec<(EdgeId, Vec<(EdgeId, u32)>)> = fresh
            .par_iter()
            .map(|&landmark| (landmark, graph.distances_from(landmark, s)))
            .collect();
        for (landmark, distances) in reached {
            for (edge, distance) in distances {
                if let Some(label) = self.labels.get_mut(edge) {
                    label.push((landmark, distance));
                }
            }
        }
        for label in &mut self.labels {
            label.sort_unstable_by_key(|&(landmark, _)| landmark);
        }
        self.landmarks.extend(fresh);
        self.landmarks.sort_unstable();
    }

    /// Overlap threshold of this oracle.
    #[must_use]
    #[rustfmt::skip]
    pub const fn s(&self) -> usize { self.s }

    /// Landmarks in ascending order.
    #[must_use]
    #[rustfmt::skip]
    pub fn landmarks(&self) -> &[EdgeId] { &self.landmarks }

    /// Number of landmarks.
    #[must_use]
    #[rustfmt::skip]
    pub fn num_landmarks(&self) -> usize { self.landmarks.len() }

    /// Whether `edge` is reached by at least one landmark.
    #[must_use]
    pub fn has_label(&self, edge: EdgeId) -> bool {
        !self.label(edge).is_empty()
    }

    /// `(landmark, distance)` pairs of `edge`, by landmark.
    #[must_use]
    pub fn label(&self, edge: EdgeId) -> &[(EdgeId, u32)] {
        self.labels.get(edge).map_or(&[], Vec::as_slice)
    }

    /// Hyperedges reached by at least one landmark, ascending.
    pub fn labelled_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| !label.is_empty())
            .map(|(edge, _)| edge)
    }

    /// Exact distance from `edge` to `landmark`, if recorded.
    #[must_use]
    pub fn distance_to(&self, edge: EdgeId, landmark: EdgeId) -> Option<u32> {
        let label = self.label(edge);
        label
            .binary_search_by_key(&landmark, |&(l, _)| l)
            .ok()
            .and_then(|slot| label.get(slot))
            .map(|&(_, distance)| distance)
    }

    /// Triangle-inequality bounds `(lower, upper)` on the distance between
    /// `first` and `second`, or `None` when they share no landmark.
    #[must_use]
    pub fn bounds_between(&self, first: EdgeId, second: EdgeId) -> Option<(u32, u32)> {
        join_labels(self.label(first), self.label(second))
    }

    /// Number of stored `(hyperedge, landmark)` distance pairs.
    #[must_use]
    pub fn oracle_size(&self) -> usize {
        self.labels.iter().map(Vec::len).sum()
    }
}

/// Merge join of two landmark-sorted labels into `(max |a - b|, min a + b)`.
pub(crate) fn join_labels(left: &[(EdgeId, u32)], right: &[(EdgeId, u32)]) -> Option<(u32, u32)> {
    let mut bounds: Option<(u32, u32)> = None;
    let (mut i, mut j) = (0, 0);
    while let (Some(&(la, da)), Some(&(lb, db))) = (left.get(i), right.get(j)) {
        match la.cmp(&lb) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                let lower = da.abs_diff(db);
                let upper = da.saturating_add(db);
                bounds = Some(match bounds {
                    Some((lo, up)) => (lo.max(lower), up.min(upper)),
                    None => (lower, upper),
                });
                i += 1;
                j += 1;
            }
        }
    }
    bounds
}
