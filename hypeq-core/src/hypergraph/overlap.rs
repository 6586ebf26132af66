//! Overlap computation: capped intersections, the eager adjacency sweep, and
//! lazy resolution from component-search candidates.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, instrument};

use super::{EdgeId, Hypergraph, VertexId};
use crate::components::ConnectedComponents;

/// Size of the intersection of two ascending vertex slices, counting no
/// further than `cap`.
///
/// # Examples
/// ```
/// use hypeq_core::capped_intersection_size;
///
/// assert_eq!(capped_intersection_size(&[1, 2, 3, 4], &[2, 3, 4, 5], 10), 3);
/// assert_eq!(capped_intersection_size(&[1, 2, 3, 4], &[2, 3, 4, 5], 2), 2);
/// assert_eq!(capped_intersection_size(&[1, 2], &[3, 4], 2), 0);
/// ```
#[must_use]
pub fn capped_intersection_size(left: &[VertexId], right: &[VertexId], cap: usize) -> usize {
    let mut count = 0;
    let (mut i, mut j) = (0, 0);
    while count < cap {
        let (Some(a), Some(b)) = (left.get(i), right.get(j)) else {
            break;
        };
        match a.cmp(b) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

fn to_overlap(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

impl Hypergraph {
    /// Computes the full overlap index with a vertex-indexed adjacency sweep.
    ///
    /// Hyperedges are visited in identifier order; each one counts the
    /// vertices it shares with the hyperedges already indexed. Overlaps are
    /// capped at `cap`, the largest threshold that will be queried.
    #[instrument(name = "core.overlaps.eager", skip(self), fields(edges = self.num_edges()))]
    pub fn compute_overlaps(&mut self, cap: usize) {
        let mut pairs = Vec::new();
        let mut counts: HashMap<EdgeId, usize> = HashMap::new();
        for edge in &self.edges {
            counts.clear();
            for &vertex in edge.vertices() {
                let earlier = self
                    .edges_of(vertex)
                    .iter()
                    .take_while(|&&other| other < edge.id());
                for &other in earlier {
                    *counts.entry(other).or_insert(0) += 1;
                }
            }
            pairs.extend(
                counts
                    .iter()
                    .map(|(&other, &count)| (other, edge.id(), to_overlap(count.min(cap)))),
            );
        }
        debug!(pairs = pairs.len(), "overlap index computed");
        self.install_overlaps(pairs);
    }

    /// Resolves the overlap index from the partial overlaps and candidate
    /// pairs recorded by the component search.
    ///
    /// Every partial overlap is installed as is. Candidate pairs are resolved
    /// with a capped intersection only when their 1-component holds more than
    /// `lb` hyperedges; smaller components are answered without traversal.
    #[instrument(name = "core.overlaps.lazy", skip(self, components))]
    pub fn resolve_overlaps(&mut self, components: &ConnectedComponents, lb: usize) {
        let cap = components.max_s();
        let known: HashSet<(EdgeId, EdgeId)> = components
            .partial_overlaps()
            .iter()
            .map(|&(a, b, _)| ordered(a, b))
            .collect();

        let mut candidates: Vec<(EdgeId, EdgeId)> = (1..=cap)
            .flat_map(|s| components.candidates(s).iter().copied())
            .map(|(a, b)| ordered(a, b))
            .filter(|pair| !known.contains(pair))
            .filter(|&(a, _)| {
                components
                    .level(1)
                    .is_some_and(|level| level.component_size_of(a) > lb)
            })
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let resolved: Vec<(EdgeId, EdgeId, u32)> = candidates
            .par_iter()
            .filter_map(|&(a, b)| {
                let count =
                    capped_intersection_size(self.vertices_of(a), self.vertices_of(b), cap);
                (count > 0).then(|| (a, b, to_overlap(count)))
            })
            .collect();
        debug!(
            partial = known.len(),
            resolved = resolved.len(),
            "overlap index resolved from candidates"
        );

        let partial = components.partial_overlaps().to_vec();
        self.install_overlaps(partial.into_iter().chain(resolved));
    }
}

const fn ordered(a: EdgeId, b: EdgeId) -> (EdgeId, EdgeId) {
    if a <= b { (a, b) } else { (b, a) }
}
