//! Probabilistic landmark budget assignment.
//!
//! Components are drawn with replacement, weighted by a convex combination of
//! their normalised size, overlap threshold and vertex count. Every draw
//! grants one more landmark to the drawn component until the estimated oracle
//! size reaches the budget. A component is withdrawn from the draw once it
//! holds as many landmarks as hyperedges.

use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::SmallRng,
};
use tracing::{debug, instrument, warn};

/// Per-component inputs of the assignment. Components too small to receive
/// landmarks carry zero in every field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct ComponentWeights {
    pub size: usize,
    pub s: usize,
    pub vertices: usize,
}

impl ComponentWeights {
    pub(crate) const fn is_eligible(&self) -> bool {
        self.size > 0
    }
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Sum of squared component sizes, stopping as soon as it exceeds `budget`.
fn max_reachable_size(weights: &[ComponentWeights], budget: u64) -> u64 {
    let mut reachable: u64 = 0;
    for w in weights {
        let size = to_u64(w.size);
        if size > budget {
            return size;
        }
        reachable = reachable.saturating_add(size.saturating_mul(size));
        if reachable > budget {
            break;
        }
    }
    reachable
}

/// Weighted draw over a shrinking set of slots.
struct ShrinkingDraw {
    weights: Vec<f64>,
    index: Option<WeightedIndex<f64>>,
}

impl ShrinkingDraw {
    fn new(weights: Vec<f64>) -> Self {
        let index = WeightedIndex::new(&weights).ok();
        Self { weights, index }
    }

    fn sample(&self, rng: &mut SmallRng) -> Option<usize> {
        self.index.as_ref().map(|index| index.sample(rng))
    }

    /// Withdraws `slot`; the draw is exhausted once every weight is zero.
    fn remove(&mut self, slot: usize) {
        if let Some(weight) = self.weights.get_mut(slot) {
            *weight = 0.0;
        }
        self.index = WeightedIndex::new(&self.weights).ok();
    }
}

/// Number of landmarks granted to every component.
///
/// Returns all zeros when no component holds more than two hyperedges, and
/// every component's size when the whole structure fits in `budget`.
#[instrument(
    name = "core.landmarks.assign",
    skip(weights, rng),
    fields(components = weights.len())
)]
pub(crate) fn assign_landmarks(
    weights: &[ComponentWeights],
    budget: u64,
    alpha: f64,
    beta: f64,
    rng: &mut SmallRng,
) -> Vec<usize> {
    let mut counts = vec![0; weights.len()];
    let max_size = weights.iter().map(|w| w.size).max().unwrap_or(0);
    if max_size <= 2 {
        return counts;
    }

    let reachable = max_reachable_size(weights, budget);
    if reachable <= budget {
        warn!(
            budget,
            reachable, "budget exceeds the largest reachable oracle size; assigning every component its size"
        );
        return weights.iter().map(|w| w.size).collect();
    }

    let sum_sizes = weights.iter().map(|w| w.size as f64).sum::<f64>().max(1.0);
    let sum_s = weights.iter().map(|w| w.s as f64).sum::<f64>().max(1.0);
    let sum_vertices = weights
        .iter()
        .map(|w| w.vertices as f64)
        .sum::<f64>()
        .max(1.0);
    let gamma = 1.0 - alpha - beta;
    let draw_weights: Vec<f64> = weights
        .iter()
        .map(|w| {
            let p = alpha * w.size as f64 / sum_sizes
                + beta * w.s as f64 / sum_s
                + gamma * w.vertices as f64 / sum_vertices;
            if p > 0.0 && p.is_finite() { p } else { 0.0 }
        })
        .collect();
    let mut draw = ShrinkingDraw::new(draw_weights);

    let mut estimate: u64 = 0;
    while estimate < budget {
        let Some(slot) = draw.sample(rng) else {
            break;
        };
        let size = weights[slot].size;
        if counts[slot] < size {
            counts[slot] += 1;
            estimate = estimate.saturating_add(to_u64(size));
        }
        if counts[slot] >= size {
            draw.remove(slot);
        }
    }
    debug!(estimate, "landmark counts assigned");
    counts
}

/// Number of candidate hyperedges sampled in every component by path-based
/// strategies.
///
/// `total` samples are spread over the components holding at least one
/// landmark, proportionally to their size and never beyond it. Every
/// component with a sample gets at least two, the minimum needed for a path.
pub(crate) fn sample_sizes(
    weights: &[ComponentWeights],
    counts: &[usize],
    total: usize,
    rng: &mut SmallRng,
) -> Vec<usize> {
    let mut samples = vec![0; weights.len()];
    let max_size = weights.iter().map(|w| w.size).max().unwrap_or(0);
    if max_size <= 2 {
        return samples;
    }
    let draw_weights: Vec<f64> = weights
        .iter()
        .zip(counts)
        .map(|(w, &count)| if count > 0 { w.size as f64 } else { 0.0 })
        .collect();
    let mut draw = ShrinkingDraw::new(draw_weights);

    let mut assigned = 0;
    while assigned < total {
        let Some(slot) = draw.sample(rng) else {
            break;
        };
        let size = weights[slot].size;
        if samples[slot] < size {
            samples[slot] += 1;
            assigned += 1;
        }
        if samples[slot] >= size {
            draw.remove(slot);
        }
    }
    for sample in samples.iter_mut().filter(|sample| **sample > 0) {
        *sample = (*sample).max(2);
    }
    samples
}
