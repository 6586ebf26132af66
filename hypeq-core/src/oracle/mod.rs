//! The multi-level distance oracle.
//!
//! [`DistanceOracle`] keeps one [`SDistanceOracle`] per overlap threshold
//! together with the component sizes and memberships needed to answer
//! queries inside components too small to hold a landmark.

mod level;
mod query;
mod reachable;
mod sampling;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::{
    Result,
    components::{ComponentId, ConnectedComponents},
    config::{LandmarkAssignment, OracleConfig, validate_importance},
    hypergraph::{EdgeId, Hypergraph},
    landmarks::{GlobalSelection, select_all, select_for_level},
};

pub use self::level::SDistanceOracle;
pub(crate) use self::query::{as_vertex, check_elements};

/// Landmark labels for every threshold plus the component structure they
/// were allocated over.
///
/// # Examples
/// ```
/// use hypeq_core::{DistanceOracle, Hypergraph, OracleConfigBuilder};
///
/// let mut graph = Hypergraph::from_edges(vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6, 7]])?;
/// let config = OracleConfigBuilder::new()
///     .with_max_s(2)
///     .with_lb(2)
///     .with_num_landmarks(30)
///     .build()?;
/// let oracle = DistanceOracle::populate(&mut graph, &config);
/// assert_eq!(oracle.oracle(1).map(|o| o.landmarks().to_vec()), Some(vec![0, 1, 2]));
/// let bounds = oracle.edge_bounds(0, 2, 1);
/// assert_eq!(bounds.as_triple(), (2.0, 2.0, 2.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceOracle {
    oracles: Vec<SDistanceOracle>,
    components: Option<ConnectedComponents>,
    lb: usize,
}

impl DistanceOracle {
    /// Builds the oracle over the nested component structure of `graph`.
    ///
    /// The overlap index is computed eagerly when the configuration asks for
    /// it and resolved from the component-search candidates otherwise. An
    /// index already installed on `graph` is kept.
    #[instrument(
        name = "core.oracle.populate",
        skip(graph, config),
        fields(
            edges = graph.num_edges(),
            max_s = config.max_s(),
            budget = config.budget(graph.num_edges()),
        )
    )]
    pub fn populate(graph: &mut Hypergraph, config: &OracleConfig) -> Self {
        let max_s = config.max_s();
        if config.precompute_neighbours() && !graph.has_overlap_index() {
            graph.compute_overlaps(max_s);
        }
        let mut components = ConnectedComponents::discover(graph, max_s);
        if !graph.has_overlap_index() {
            graph.resolve_overlaps(&components, config.lb());
        }
        components.clear_transient();

        let budget = config.budget(graph.num_edges());
        let landmarks = select_all(graph, &components, config, budget);
        let selected: usize = landmarks.iter().map(Vec::len).sum();
        info!(landmarks = selected, "landmarks selected");

        let graph: &Hypergraph = graph;
        let oracles: Vec<SDistanceOracle> = landmarks
            .par_iter()
            .enumerate()
            .map(|(slot, chosen)| SDistanceOracle::from_landmarks(graph, slot + 1, chosen))
            .collect();
        let oracle = Self {
            oracles,
            components: Some(components),
            lb: config.lb(),
        };
        oracle.report();
        oracle
    }

    /// Builds every level independently: a single-level component search,
    /// an equal share of the budget and landmarks weighted by component size
    /// and vertex count only, with `alpha + beta / 2` as size importance.
    ///
    /// # Errors
    /// Returns [`crate::HypeqError::InvalidImportance`] when the combined
    /// size importance exceeds one.
    #[instrument(
        name = "core.oracle.populate_per_level",
        skip(graph, config),
        fields(edges = graph.num_edges(), max_s = config.max_s())
    )]
    pub fn populate_per_level(graph: &mut Hypergraph, config: &OracleConfig) -> Result<Self> {
        let alpha = config.alpha() + config.beta() / 2.0;
        validate_importance(alpha, 0.0, LandmarkAssignment::Probability)?;
        let max_s = config.max_s();
        if !graph.has_overlap_index() {
            graph.compute_overlaps(max_s);
        }
        let graph: &Hypergraph = graph;
        let components = ConnectedComponents::discover_per_level(graph, max_s);
        let max_s_u64 = u64::try_from(max_s).unwrap_or(u64::MAX).max(1);
        let budget_per_level = config.budget(graph.num_edges()) / max_s_u64;

        let oracles: Vec<SDistanceOracle> = components
            .levels()
            .par_iter()
            .map(|level| {
                let landmarks = select_for_level(graph, level, config, alpha, budget_per_level);
                debug!(s = level.s(), landmarks = landmarks.len(), "level landmarks selected");
                SDistanceOracle::from_landmarks(graph, level.s(), &landmarks)
            })
            .collect();
        let oracle = Self {
            oracles,
            components: Some(components),
            lb: config.lb(),
        };
        oracle.report();
        Ok(oracle)
    }

    /// Builds the oracle without any component structure: landmarks are
    /// added to every level in rounds until the label budget is spent.
    #[instrument(
        name = "core.oracle.populate_baseline",
        skip(graph, config),
        fields(edges = graph.num_edges(), max_s = config.max_s())
    )]
    pub fn populate_baseline(graph: &mut Hypergraph, config: &OracleConfig) -> Self {
        let max_s = config.max_s();
        if !graph.has_overlap_index() {
            graph.compute_overlaps(max_s);
        }
        let graph: &Hypergraph = graph;
        let budget = config.budget(graph.num_edges());
        let per_level = u64::try_from(max_s.saturating_mul(graph.num_edges()))
            .unwrap_or(u64::MAX)
            .max(1);

        let mut oracles: Vec<SDistanceOracle> = (1..=max_s)
            .map(|s| SDistanceOracle::empty(graph, s))
            .collect();
        let mut selection = GlobalSelection::new(graph, config);
        let mut sizes = vec![0_usize; oracles.len()];
        let mut estimate: u64 = 0;
        'rounds: while estimate < budget {
            let count = usize::try_from((budget - estimate) / per_level)
                .unwrap_or(usize::MAX)
                .max(1);
            let mut grew = false;
            for slot in 0..oracles.len() {
                let oracle = &mut oracles[slot];
                let chosen = selection.select(oracle.landmarks(), count, oracle.s());
                grew |= !chosen.is_empty();
                oracle.populate(graph, &chosen);
                sizes[slot] = oracle.oracle_size();
                estimate = u64::try_from(sizes.iter().sum::<usize>()).unwrap_or(u64::MAX);
                if estimate >= budget {
                    break 'rounds;
                }
            }
            if !grew {
                debug!(estimate, "no level can take another landmark");
                break;
            }
        }
        let oracle = Self {
            oracles,
            components: None,
            lb: config.lb(),
        };
        oracle.report();
        oracle
    }

    fn report(&self) {
        let landmarks = self.num_landmarks();
        let oracle_size = self.oracle_size();
        info!(landmarks, oracle_size, "oracle populated");
        record_population(landmarks, oracle_size, self.component_struct_size());
    }

    /// Oracle of threshold `s`, if `1 <= s <= max_s`.
    #[must_use]
    pub fn oracle(&self, s: usize) -> Option<&SDistanceOracle> {
        s.checked_sub(1).and_then(|slot| self.oracles.get(slot))
    }

    /// Oracles of every threshold in ascending `s`.
    #[must_use]
    #[rustfmt::skip]
    pub fn oracles(&self) -> &[SDistanceOracle] { &self.oracles }

    /// Largest threshold answered by the oracle.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_s(&self) -> usize { self.oracles.len() }

    /// Components at most this large are answered without landmarks.
    #[must_use]
    #[rustfmt::skip]
    pub const fn lb(&self) -> usize { self.lb }

    /// Component structure the landmarks were allocated over; `None` for the
    /// baseline population.
    #[must_use]
    #[rustfmt::skip]
    pub const fn components(&self) -> Option<&ConnectedComponents> { self.components.as_ref() }

    /// Component of `edge` at threshold `s`.
    #[must_use]
    pub fn component_of(&self, edge: EdgeId, s: usize) -> Option<ComponentId> {
        self.components
            .as_ref()
            .and_then(|components| components.component_of(edge, s))
    }

    /// Size of component `id` at threshold `s`; zero when unknown.
    #[must_use]
    pub fn component_size(&self, s: usize, id: ComponentId) -> usize {
        self.components
            .as_ref()
            .map_or(0, |components| components.component_size(s, id))
    }

    /// Largest threshold at which `edge` belongs to a component; 1 when none.
    #[must_use]
    pub fn max_membership_level(&self, edge: EdgeId) -> usize {
        self.components
            .as_ref()
            .map_or(1, |components| components.max_membership_level(edge))
    }

    /// Total number of stored distance pairs.
    #[must_use]
    pub fn oracle_size(&self) -> usize {
        oracles_size(&self.oracles)
    }

    /// Number of stored component sizes plus memberships.
    #[must_use]
    pub fn component_struct_size(&self) -> usize {
        self.components
            .as_ref()
            .map_or(0, ConnectedComponents::struct_size)
    }

    /// Number of landmarks across levels.
    #[must_use]
    pub fn num_landmarks(&self) -> usize {
        self.oracles.iter().map(SDistanceOracle::num_landmarks).sum()
    }

    /// Landmarks of every level in ascending `s`.
    #[must_use]
    pub fn all_landmarks(&self) -> Vec<&[EdgeId]> {
        self.oracles.iter().map(SDistanceOracle::landmarks).collect()
    }
}

fn oracles_size(oracles: &[SDistanceOracle]) -> usize {
    oracles.iter().map(SDistanceOracle::oracle_size).sum()
}

#[cfg(feature = "metrics")]
fn record_population(landmarks: usize, oracle_size: usize, struct_size: usize) {
    metrics::counter!("hypeq_oracle_builds_total").increment(1);
    metrics::gauge!("hypeq_oracle_landmarks").set(landmarks as f64);
    metrics::gauge!("hypeq_oracle_size").set(oracle_size as f64);
    metrics::gauge!("hypeq_oracle_component_struct_size").set(struct_size as f64);
}

#[cfg(not(feature = "metrics"))]
fn record_population(_landmarks: usize, _oracle_size: usize, _struct_size: usize) {}

#[cfg(test)]
mod tests;
